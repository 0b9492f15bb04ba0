//! # NSOF dump
//!
//! Decode a Newton Streamed Object Format payload given as hex and print the
//! objects it contains. Payloads starting with the version byte are read as
//! versioned streams, anything else as a bare object sequence.
//!
//! ```bash
//! cargo run --example nsof_dump -- "02 05 02 00 04 00 08"
//! ```

use newt_dock::infra::codec::nsof::{decode_all, decode_versioned, NSOF_VERSION};

/// Store-name frame `{name: "Internal"}` used when no argument is given.
const SAMPLE: &str = "02 06 01 07 04 6E 61 6D 65 08 12 00 49 00 6E 00 74 00 65 00 72 00 6E 00 61 00 6C 00 00";

fn parse_hex(text: &str) -> Result<Vec<u8>, String> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", digits.len()));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|err| format!("bad hex at offset {i}: {err}"))
        })
        .collect()
}

fn main() {
    let input = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let input = if input.trim().is_empty() {
        println!("(no input, using a sample store frame)\n");
        SAMPLE.to_string()
    } else {
        input
    };

    let bytes = match parse_hex(&input) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };
    println!("{} bytes", bytes.len());

    let decoded = if bytes.first() == Some(&NSOF_VERSION) {
        decode_versioned(&bytes)
    } else {
        decode_all(&bytes)
    };

    match decoded {
        Ok(stream) => {
            println!(
                "{} objects, {} registered for precedents\n",
                stream.len(),
                stream.registered().len()
            );
            for (i, &root) in stream.roots().iter().enumerate() {
                match stream.to_value(root) {
                    Ok(value) => println!("[{i}] {value}"),
                    Err(err) => println!("[{i}] <{err}>"),
                }
            }
        }
        Err(err) => {
            eprintln!("decode failed: {err}");
            std::process::exit(1);
        }
    }
}
