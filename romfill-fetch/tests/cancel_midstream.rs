use std::sync::Mutex;
use std::time::Duration;

use romfill_core::{Obligation, Outcome, ProgressSample};
use romfill_fetch::{AbortReason, CancellationToken, Credentials, FetchClient, run_batch};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

const SENT: usize = 4096;

/// Origin that announces a large body, sends a little of it, then stalls.
async fn stalling_origin() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut request = vec![0u8; 4096];
                let _ = socket.read(&mut request).await;
                let head = "HTTP/1.1 200 OK\r\n\
                            Content-Type: application/octet-stream\r\n\
                            Content-Length: 1048576\r\n\r\n";
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&[0xAB; SENT]).await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_secs(30)).await;
            });
        }
    });
    format!("http://{addr}/")
}

#[tokio::test]
async fn cancel_mid_stream_keeps_partial_file() {
    let origin = stalling_origin().await;
    let client = FetchClient::new(&origin, Credentials::new("u", "p")).unwrap();
    let dest = tempfile::tempdir().unwrap();
    let cancel = CancellationToken::new();

    let seen = Mutex::new(Vec::<u64>::new());
    let sink = |s: ProgressSample| {
        seen.lock().unwrap().push(s.bytes_received);
        if s.bytes_received > 0 {
            cancel.cancel();
        }
    };

    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        client.fetch(&Obligation::rom_archive("big"), dest.path(), &cancel, Some(&sink)),
    )
    .await
    .unwrap();

    assert_eq!(outcome, Outcome::Canceled);
    let partial = std::fs::read(dest.path().join("currentroms/big.zip")).unwrap();
    assert!(!partial.is_empty());
    assert!(partial.len() <= SENT);
    assert!(partial.iter().all(|&b| b == 0xAB));
    assert_eq!(seen.lock().unwrap().first(), Some(&0));
}

#[tokio::test]
async fn cancel_mid_stream_halts_the_batch() {
    let origin = stalling_origin().await;
    let client = FetchClient::new(&origin, Credentials::new("u", "p")).unwrap();
    let dest = tempfile::tempdir().unwrap();
    let cancel = CancellationToken::new();
    let items = vec![Obligation::rom_archive("first"), Obligation::rom_archive("second")];

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let (tx, _rx) = mpsc::unbounded_channel();
    let report = tokio::time::timeout(
        Duration::from_secs(10),
        run_batch(&client, &items, dest.path(), &cancel, &tx),
    )
    .await
    .unwrap();

    assert_eq!(report.abort, Some(AbortReason::Canceled));
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].1, Outcome::Canceled);
    assert!(report.successes().is_empty());
    assert!(!dest.path().join("currentroms/second.zip").exists());
}
