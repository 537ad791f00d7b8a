//! End-to-end tests driving [`wilhelm::Engine`] through real files.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use wilhelm::format::ciphertext_len;
use wilhelm::{Engine, Error};

/// Scratch files under the system temp dir, removed on drop. Names are
/// unique across the whole (multi-threaded) test run.
struct Scratch {
    paths: Vec<PathBuf>,
}

static NEXT_SCRATCH: AtomicUsize = AtomicUsize::new(0);

impl Scratch {
    fn new() -> Self {
        Scratch { paths: Vec::new() }
    }

    fn file(&mut self, name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "wilhelm-{}-{}-{name}",
            std::process::id(),
            NEXT_SCRATCH.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&path, contents).unwrap();
        self.paths.push(path.clone());
        path
    }

    fn out(&mut self, name: &str) -> PathBuf {
        self.file(name, b"")
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        for p in &self.paths {
            let _ = fs::remove_file(p);
        }
    }
}

fn encrypt_file(s: &mut Scratch, plaintext: &[u8], passphrase: &[u8]) -> PathBuf {
    let input = s.file("plain", plaintext);
    let output = s.out("cipher");
    let mut engine = Engine::new();
    engine.set_input(&input).unwrap();
    engine.set_key(passphrase);
    engine.set_output(&output).unwrap();
    engine.encrypt().unwrap();
    assert_eq!(engine.size(), plaintext.len() as u64);
    output
}

fn decrypt_file(s: &mut Scratch, ciphertext: &PathBuf, passphrase: &[u8]) -> (bool, Vec<u8>) {
    let output = s.out("recovered");
    let mut engine = Engine::new();
    engine.set_input(ciphertext).unwrap();
    engine.set_key(passphrase);
    engine.set_output(&output).unwrap();
    let ok = engine.decrypt().unwrap();
    (ok, fs::read(&output).unwrap())
}

#[test]
fn round_trip_recovers_the_plaintext() {
    let mut s = Scratch::new();
    for plen in [1usize, 31, 32, 33, 4095, 4096, 4097, 10_000] {
        let pt: Vec<u8> = (0..plen).map(|i| (i % 251) as u8).collect();
        let ct_path = encrypt_file(&mut s, &pt, b"password");
        assert_eq!(
            fs::metadata(&ct_path).unwrap().len(),
            ciphertext_len(plen as u64),
            "ciphertext length for {plen}"
        );
        let (ok, rec) = decrypt_file(&mut s, &ct_path, b"password");
        assert!(ok, "verification for {plen}");
        assert_eq!(rec, pt, "recovered plaintext for {plen}");
    }
}

#[test]
fn empty_file_round_trip() {
    // A zero-length input still occupies one (zero-filled) data block, so
    // the minimum-size ciphertext verifies and decodes to one zero block.
    let mut s = Scratch::new();
    let ct_path = encrypt_file(&mut s, b"", b"");
    assert_eq!(fs::metadata(&ct_path).unwrap().len(), 128);
    let (ok, rec) = decrypt_file(&mut s, &ct_path, b"");
    assert!(ok);
    assert_eq!(rec, vec![0u8; 32]);
}

#[test]
fn fresh_ivs_give_different_ciphertexts() {
    let mut s = Scratch::new();
    let pt = vec![0x42u8; 500];
    let ct_a = encrypt_file(&mut s, &pt, b"pw");
    let ct_b = encrypt_file(&mut s, &pt, b"pw");
    let a = fs::read(&ct_a).unwrap();
    let b = fs::read(&ct_b).unwrap();
    assert_eq!(a.len(), b.len());
    // With distinct random IVs the streams diverge from the first block.
    assert_ne!(a[..32], b[..32]);
    assert_ne!(a[32..64], b[32..64]);
    let (ok_a, rec_a) = decrypt_file(&mut s, &ct_a, b"pw");
    let (ok_b, rec_b) = decrypt_file(&mut s, &ct_b, b"pw");
    assert!(ok_a && ok_b);
    assert_eq!(rec_a, pt);
    assert_eq!(rec_b, pt);
}

#[test]
fn wrong_passphrase_fails_verification() {
    let mut s = Scratch::new();
    let ct_path = encrypt_file(&mut s, &[7u8; 1000], b"right");
    let (ok, _) = decrypt_file(&mut s, &ct_path, b"wrong");
    assert!(!ok);
}

#[test]
fn flipped_ciphertext_bit_fails_verification() {
    let mut s = Scratch::new();
    let ct_path = encrypt_file(&mut s, &[9u8; 5000], b"pw");
    let mut ct = fs::read(&ct_path).unwrap();
    ct[1000] ^= 0x10;
    fs::write(&ct_path, &ct).unwrap();
    let (ok, _) = decrypt_file(&mut s, &ct_path, b"pw");
    assert!(!ok);
}

#[test]
fn pass_state_is_required_in_order() {
    let mut engine = Engine::new();
    assert!(matches!(engine.encrypt(), Err(Error::NoInput)));

    let mut s = Scratch::new();
    let input = s.file("plain", b"data");
    engine.set_input(&input).unwrap();
    assert!(matches!(engine.encrypt(), Err(Error::NoOutput)));

    engine.set_input(&input).unwrap();
    engine.set_output(s.out("cipher")).unwrap();
    assert!(matches!(engine.encrypt(), Err(Error::NoKey)));
}

#[test]
fn malformed_ciphertext_is_rejected() {
    let mut s = Scratch::new();

    let empty = s.file("empty", b"");
    let mut engine = Engine::new();
    engine.set_input(&empty).unwrap();
    engine.set_key(b"pw");
    engine.set_output(s.out("o1")).unwrap();
    assert!(matches!(engine.decrypt(), Err(Error::Empty)));

    let ragged = s.file("ragged", &[0u8; 130]);
    engine.set_input(&ragged).unwrap();
    engine.set_output(s.out("o2")).unwrap();
    assert!(matches!(engine.decrypt(), Err(Error::Misaligned(130))));

    let short = s.file("short", &[0u8; 96]);
    engine.set_input(&short).unwrap();
    engine.set_output(s.out("o3")).unwrap();
    assert!(matches!(engine.decrypt(), Err(Error::Truncated(96))));
}

#[test]
fn missing_input_file_is_an_io_error() {
    let mut engine = Engine::new();
    let missing = std::env::temp_dir().join("wilhelm-definitely-not-here");
    assert!(matches!(engine.set_input(&missing), Err(Error::Io(_))));
}

#[test]
fn key_survives_a_pass_but_streams_do_not() {
    let mut s = Scratch::new();
    let input = s.file("plain", &[3u8; 100]);
    let ct = s.out("cipher");

    let mut engine = Engine::new();
    engine.set_key(b"pw");
    engine.set_input(&input).unwrap();
    engine.set_output(&ct).unwrap();
    engine.encrypt().unwrap();

    // The streams were consumed by the pass; the key was not.
    assert!(matches!(engine.encrypt(), Err(Error::NoInput)));
    engine.set_input(&ct).unwrap();
    engine.set_output(s.out("recovered")).unwrap();
    assert!(engine.decrypt().unwrap());
}
