use syncwatch_core::admin::{AdminConsole, Notice};
use syncwatch_core::commands::CommandChannel;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

pub const BANNER: &str = "syncwatch admin console; type `help` for commands\n";

/// Feeds `input` line by line into the admin console and writes every
/// notice to `output`. Returns when input ends or on shutdown.
pub async fn run_console<C, R, W>(
    console: AdminConsole<C>,
    input: R,
    mut output: W,
    shutdown: CancellationToken,
) -> std::io::Result<()>
where
    C: CommandChannel,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(BANNER.as_bytes()).await?;
    output.flush().await?;

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            log::info!("Admin console input closed");
            break;
        };

        if let Some(notice) = console.handle_line(&line).await {
            output.write_all(render(&notice).as_bytes()).await?;
            output.flush().await?;
        }
    }
    Ok(())
}

fn render(notice: &Notice) -> String {
    if notice.is_failure() {
        format!("error: {}\n", notice.text())
    } else {
        format!("{}\n", notice.text())
    }
}
