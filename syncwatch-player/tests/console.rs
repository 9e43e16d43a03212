#[path = "support/mod.rs"]
mod support;

use std::time::Duration;

use support::FakeController;
use syncwatch_core::admin::AdminConsole;
use syncwatch_core::commands::CredentialStore;
use syncwatch_player::infrastructure::HttpCommandChannel;
use syncwatch_player::infrastructure::console::{BANNER, run_console};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn typed_lines_reach_the_controller() {
    let controller = FakeController::guarded("letmein").await;
    let credentials = CredentialStore::default();
    let channel = HttpCommandChannel::new(
        controller.base_url.clone(),
        credentials.clone(),
        Duration::from_secs(5),
    )
    .unwrap();
    let console = AdminConsole::new(channel, credentials);

    let input: &[u8] =
        b"pause\nfrobnicate\n\npassword letmein\nseek 1:30\nseek -4\n";
    let mut output = Vec::new();
    run_console(console, input, &mut output, CancellationToken::new())
        .await
        .unwrap();

    let output = String::from_utf8(output).unwrap();
    let mut lines = output.strip_prefix(BANNER).unwrap().lines();
    assert_eq!(
        lines.next(),
        Some("error: controller rejected pause: 401 invalid credential")
    );
    assert!(
        lines
            .next()
            .unwrap()
            .starts_with("error: unknown command `frobnicate`")
    );
    assert_eq!(lines.next(), Some("credential updated"));
    assert_eq!(lines.next(), Some("seek sent"));
    assert!(lines.next().unwrap().starts_with("error: seek dropped"));
    assert_eq!(lines.next(), None);

    let paths: Vec<_> =
        controller.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, ["/pause", "/seek"]);
}

#[tokio::test]
async fn shutdown_stops_a_waiting_console() {
    let controller = FakeController::open().await;
    let credentials = CredentialStore::default();
    let channel = HttpCommandChannel::new(
        controller.base_url.clone(),
        credentials.clone(),
        Duration::from_secs(5),
    )
    .unwrap();
    let console = AdminConsole::new(channel, credentials);

    // Input that never ends.
    let (_writer, reader) = tokio::io::duplex(64);
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(run_console(
        console,
        tokio::io::BufReader::new(reader),
        tokio::io::sink(),
        shutdown.clone(),
    ));

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("console stops on shutdown")
        .unwrap()
        .unwrap();
}
