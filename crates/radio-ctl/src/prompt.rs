use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};

/// Line-oriented prompt over any async reader/writer pair.
pub struct Console<R, W> {
    lines: Lines<R>,
    out: W,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
        }
    }

    /// Print `question` without a newline and read one answer.
    /// `Ok(None)` means input has ended.
    pub async fn ask(&mut self, question: &str) -> anyhow::Result<Option<String>> {
        self.out.write_all(question.as_bytes()).await?;
        self.out.flush().await?;
        Ok(self.lines.next_line().await?)
    }
}

pub fn stdio() -> Console<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    Console::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
}
