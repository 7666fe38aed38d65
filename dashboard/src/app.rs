//! Interactive shell around the poll loop and the prompt selector.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::auth::Session;
use crate::commands::{parse_command, UserCommand, USAGE};
use crate::errors::Result;
use crate::poller::Poller;
use crate::prompts::PromptSelector;
use crate::render::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Dashboard {
    poller: Poller,
    prompts: Arc<PromptSelector>,
    session: Arc<dyn Session>,
}

impl Dashboard {
    pub fn new(poller: Poller, prompts: Arc<PromptSelector>, session: Arc<dyn Session>) -> Self {
        Self {
            poller,
            prompts,
            session,
        }
    }

    /// Re-renders the panel whenever the poll loop publishes a new snapshot.
    pub fn spawn_renderer(&self) -> JoinHandle<()> {
        let mut snapshots = self.poller.subscribe();
        let prompts = Arc::clone(&self.prompts);

        tokio::spawn(async move {
            loop {
                let snapshot = snapshots.borrow_and_update().clone();
                println!("{}", render(&snapshot, prompts.cached().await.as_ref()));

                if snapshots.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    pub async fn print(&self) {
        let prompts = self.prompts.cached().await;
        println!("{}", render(&self.poller.snapshot(), prompts.as_ref()));
    }

    pub async fn handle(&self, command: UserCommand) -> Result<Flow> {
        match command {
            UserCommand::AutoUpdate(enabled) => self.poller.set_auto_update(enabled).await?,
            UserCommand::Interval(period) => self.poller.set_interval(period).await?,
            UserCommand::Refresh => self.poller.refresh().await?,
            UserCommand::Prompts => {
                self.prompts.refresh().await?;
                self.print().await;
            }
            UserCommand::SelectPrompt(id) => {
                self.prompts.select(&id).await?;
                self.print().await;
            }
            UserCommand::Logout => {
                self.poller.stop();
                if let Err(err) = self.session.sign_out().await {
                    warn!("Sign out failed: {}", err);
                }
                println!("로그아웃 되었습니다.");
                return Ok(Flow::Exit);
            }
            UserCommand::Quit => {
                self.poller.stop();
                return Ok(Flow::Exit);
            }
            UserCommand::Help => println!("{}", USAGE),
        }

        Ok(Flow::Continue)
    }

    /// Reads commands line by line until `quit`, `logout` or end of input.
    pub async fn run<R>(&self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let command = match parse_command(&line) {
                Ok(command) => command,
                Err(err) => {
                    println!("{}\n{}", err, USAGE);
                    continue;
                }
            };

            match self.handle(command).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(()),
                Err(err) => {
                    error!("{}", err);
                    println!("{}", err);
                }
            }
        }

        self.poller.stop();
        Ok(())
    }
}
