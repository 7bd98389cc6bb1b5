#![cfg(unix)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

struct Daemon {
    child: Child,
    port: u16,
    _dir: TempDir,
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn start_daemon(worker_port: u16) -> Daemon {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("procwatch.json");
    std::fs::write(
        &config_path,
        format!(
            r#"{{
                "processes": [
                    {{ "name": "worker", "command": "sleep", "args": ["5"], "pauseMs": 0, "port": {} }}
                ],
                "logLevel": "DEBUG",
                "healthCheckIntervalSeconds": 3600
            }}"#,
            worker_port
        ),
    )
    .unwrap();

    let port = free_port();
    let child = Command::new(assert_cmd::cargo::cargo_bin("procwatch"))
        .arg("--config")
        .arg(&config_path)
        .arg("--listen")
        .arg(format!("127.0.0.1:{}", port))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let daemon = Daemon {
        child,
        port,
        _dir: dir,
    };

    let deadline = Instant::now() + Duration::from_secs(10);
    while TcpStream::connect(("127.0.0.1", port)).is_err() {
        assert!(Instant::now() < deadline, "daemon never started listening");
        thread::sleep(Duration::from_millis(50));
    }
    daemon
}

fn request(port: u16, method: &str, path: &str) -> String {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();
    write!(
        stream,
        "{} {} HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        method, path
    )
    .unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    response
}

#[test]
fn test_health_reflects_worker_port() {
    let worker = TcpListener::bind("127.0.0.1:0").unwrap();
    let worker_port = worker.local_addr().unwrap().port();
    let daemon = start_daemon(worker_port);

    let healthy = request(daemon.port, "GET", "/health");
    assert!(healthy.starts_with("HTTP/1.1 200"), "{}", healthy);

    drop(worker);
    let unhealthy = request(daemon.port, "GET", "/health");
    assert!(unhealthy.starts_with("HTTP/1.1 503"), "{}", unhealthy);
    assert!(unhealthy.contains("One or more processes are not healthy"));
}

#[test]
fn test_restart_when_healthy_is_not_needed() {
    let worker = TcpListener::bind("127.0.0.1:0").unwrap();
    let daemon = start_daemon(worker.local_addr().unwrap().port());

    let response = request(daemon.port, "POST", "/restart");
    assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
    assert!(response.contains("no restart needed"));
}

#[test]
fn test_restart_when_unhealthy_is_performed() {
    let daemon = start_daemon(free_port());

    let response = request(daemon.port, "POST", "/restart");
    assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
    assert!(response.contains("Processes restarted"));
}
