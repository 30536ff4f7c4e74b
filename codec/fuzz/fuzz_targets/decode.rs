#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use transmission_codec::{evaluate, version_sum, BitReader, Config, Encode, Packet, Read};

const MAX_DEPTH: usize = 64;

#[derive(Arbitrary, Debug)]
enum FuzzInput {
    // Raw bits, with up to 7 bits of the final byte hidden.
    Bits { data: Vec<u8>, hidden: u8 },
    // Text as it would arrive on the command line.
    Hex(String),
}

fn fuzz_reader(mut reader: BitReader) {
    let mut original = reader.clone();
    let Ok(packet) = Packet::read_cfg(&mut reader, &Config::new(MAX_DEPTH)) else {
        return;
    };

    // Folds must not panic on any decoded tree.
    let _ = evaluate(&packet);
    let _ = version_sum(&packet);

    // Re-encoding must reproduce exactly the bits that were consumed.
    let mut encoded = packet.encode().into_reader();
    assert_eq!(encoded.len(), reader.position(), "encoded length differs from input");
    while encoded.remaining() > 0 {
        let expected = original.read_bool().expect("input has enough bits");
        let actual = encoded.read_bool().expect("encoding has enough bits");
        assert_eq!(expected, actual, "re-encoded bits differ from input");
    }
}

fn fuzz(input: FuzzInput) {
    match input {
        FuzzInput::Bits { data, hidden } => {
            let num_bits = (data.len() * 8).saturating_sub((hidden % 8) as usize);
            let reader = BitReader::new(data, num_bits).expect("length fits the buffer");
            fuzz_reader(reader);
        }
        FuzzInput::Hex(text) => {
            if let Ok(reader) = BitReader::from_hex(&text) {
                fuzz_reader(reader);
            }
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
