use std::error::Error;
use std::fs;
use std::net::TcpListener;
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

fn fanowire_command() -> Command {
    Command::new(env!("CARGO_BIN_EXE_fanowire"))
}

fn run(args: &[&str]) -> Result<Output, Box<dyn Error>> {
    Ok(fanowire_command().args(args).output()?)
}

fn sample_image() -> Vec<u8> {
    let mut body = b"\x89PNG\r\n\x1a\n".to_vec();
    for i in 0..400u32 {
        body.push((i % 7) as u8 * 31);
        body.push((i % 3) as u8);
    }
    body
}

#[test]
fn version_flag() -> Result<(), Box<dyn Error>> {
    let output = run(&["-V"])?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("fanowire "));
    assert!(stdout.contains("build"));
    Ok(())
}

#[test]
fn no_subcommand_prints_help() -> Result<(), Box<dyn Error>> {
    let output = run(&[])?;
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout)?.contains("Usage: fanowire"));
    Ok(())
}

#[test]
fn encode_info_decode_flow() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("notes.txt");
    let envelope = dir.path().join("notes.json");
    let recovered = dir.path().join("recovered.txt");
    fs::write(&input, b"AAAB")?;

    let encode = run(&[
        "encode",
        "--any-type",
        "--errors",
        "5",
        "--seed",
        "11",
        input.to_str().unwrap(),
        envelope.to_str().unwrap(),
    ])?;
    assert!(
        encode.status.success(),
        "encode command failed: {}",
        String::from_utf8_lossy(&encode.stderr)
    );
    assert!(String::from_utf8(encode.stdout)?.contains("Encoded"));
    assert!(envelope.exists());

    let info = run(&["info", envelope.to_str().unwrap()])?;
    let info_stdout = String::from_utf8(info.stdout)?;
    assert!(info_stdout.contains("Compression: fano-shannon"));
    assert!(info_stdout.contains("Blocks: 19"));
    assert!(info_stdout.contains("Injected errors: 121"));

    let decode = run(&[
        "decode",
        envelope.to_str().unwrap(),
        "-o",
        recovered.to_str().unwrap(),
    ])?;
    assert!(
        decode.status.success(),
        "decode command failed: {}",
        String::from_utf8_lossy(&decode.stderr)
    );
    let report = String::from_utf8(decode.stdout)?;
    assert!(report.contains("sha256_match"));
    assert_eq!(fs::read(&recovered)?, b"AAAB");
    Ok(())
}

#[test]
fn run_roundtrips_an_image() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("picture.png");
    fs::write(&input, sample_image())?;

    let output = run(&["run", "--errors", "3", "--seed", "7", input.to_str().unwrap()])?;
    assert!(
        output.status.success(),
        "run command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("SHA256 match: true"));
    assert!(stdout.contains("---PROCESSING COMPLETED SUCCESSFULLY---"));
    Ok(())
}

#[test]
fn non_image_input_is_rejected() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("document.txt");
    fs::write(&input, b"not a picture")?;

    let output = run(&["run", input.to_str().unwrap()])?;
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)?.contains("Error:"));
    Ok(())
}

#[test]
fn stats_reports_code_and_channel() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("sample.bin");
    fs::write(&input, b"aaaaabbccd")?;

    let output = run(&["stats", input.to_str().unwrap()])?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Distinct symbols: 4/256"));
    assert!(stdout.contains("Average code length: 1.8000 bits"));
    assert!(stdout.contains("Correctable per block: 31 bits"));
    Ok(())
}

#[test]
fn send_to_closed_port_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("picture.png");
    fs::write(&input, sample_image())?;

    // bind then drop so nothing is listening on the port
    let port = TcpListener::bind("127.0.0.1:0")?.local_addr()?.port();
    let url = format!("http://127.0.0.1:{}", port);

    let output = run(&[
        "send",
        "--url",
        &url,
        "--timeout",
        "5",
        input.to_str().unwrap(),
    ])?;
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)?.contains("Error:"));
    Ok(())
}

/// Background `fanowire serve`, killed on drop
struct Receiver {
    child: Child,
    url: String,
}

impl Receiver {
    fn start() -> Result<Self, Box<dyn Error>> {
        let port = TcpListener::bind("127.0.0.1:0")?.local_addr()?.port();
        let child = fanowire_command()
            .args(["serve", "--host", "127.0.0.1", "--port", &port.to_string()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        let receiver = Receiver {
            child,
            url: format!("http://127.0.0.1:{}", port),
        };

        let health = format!("{}/health", receiver.url);
        for _ in 0..100 {
            if let Ok(response) = reqwest::blocking::get(&health) {
                if response.status().is_success() {
                    return Ok(receiver);
                }
            }
            thread::sleep(Duration::from_millis(100));
        }
        Err("receiver did not come up".into())
    }
}

impl Drop for Receiver {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[test]
fn send_reaches_a_serving_receiver() -> Result<(), Box<dyn Error>> {
    let receiver = Receiver::start()?;
    let dir = tempdir()?;
    let input = dir.path().join("picture.png");
    fs::write(&input, sample_image())?;

    let output = run(&[
        "send",
        "--url",
        &receiver.url,
        "--errors",
        "3",
        "--seed",
        "5",
        input.to_str().unwrap(),
    ])?;
    assert!(
        output.status.success(),
        "send command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("SHA256 match: true"));
    assert!(stdout.contains("---PROCESSING COMPLETED SUCCESSFULLY---"));
    Ok(())
}

#[test]
fn decode_of_garbage_reports_failure() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let envelope = dir.path().join("broken.json");
    fs::write(&envelope, b"{\"encoded_message\": 12}")?;

    let output = run(&["decode", envelope.to_str().unwrap()])?;
    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Decoding failed"));
    Ok(())
}
