use drill_core::model::{BatchRequest, DrillMode, Identity, UserId};
use services::{
    AppServices, AuthError, BatchOrigin, BatchStart, IdentityContext, PersistenceHandles,
    ProfileView, SessionState,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, warn};

use crate::command::{Command, HELP};

const RECENT_RESULTS: u32 = 5;

/// Line-oriented front end over the drill services.
pub struct Terminal {
    services: AppServices,
    identity: IdentityContext,
    state: SessionState,
    request: BatchRequest,
    pending: Vec<PersistenceHandles>,
}

impl Terminal {
    pub fn new(services: AppServices, identity: IdentityContext, request: BatchRequest) -> Self {
        Self {
            services,
            identity,
            state: SessionState::new(),
            request,
            pending: Vec::new(),
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        self.greet();
        while let Some(line) = next_line(&mut lines).await? {
            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(err) => {
                    println!("{err}");
                    continue;
                }
            };
            if command == Command::Quit {
                break;
            }
            self.dispatch(command).await?;
        }

        self.flush().await;
        Ok(())
    }

    fn greet(&self) {
        match self.identity.identity() {
            Identity::Registered(user_id) => println!("Welcome back (user {user_id})."),
            _ => println!("Sign in with `login`, create an account with `register` or play as `guest`."),
        }
        println!("Type `next` to start a batch, `help` for all commands.");
    }

    async fn dispatch(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
            Command::Register { username, password } => {
                if !self.signed_out() {
                    return Ok(());
                }
                let registered = self.services.auth().register(&username, &password).await;
                self.sign_in(registered).await;
            }
            Command::Login { username, password } => {
                if !self.signed_out() {
                    return Ok(());
                }
                let logged_in = self.services.auth().login(&username, &password).await;
                self.sign_in(logged_in).await;
            }
            Command::Guest => match self.identity.continue_as_guest() {
                Ok(_) => println!("Playing as guest; progress is not saved."),
                Err(err) => println!("{err}"),
            },
            Command::Logout => match self.identity.logout().await {
                Ok(_) => println!("Signed out."),
                Err(err) => println!("{err}"),
            },
            Command::Next => self.next_batch().await?,
            Command::Mode(token) => match DrillMode::new(token) {
                Ok(mode) => self.change_request(mode, self.request.count()).await?,
                Err(err) => println!("{err}"),
            },
            Command::Count(count) => {
                let mode = self.request.mode().clone();
                self.change_request(mode, count).await?;
            }
            Command::Answer { .. } | Command::Answers(_) if self.state.batch().is_empty() => {
                println!("No batch yet; type `next`.");
            }
            Command::Answer { index, value } => {
                if !self.state.record_answer(index, value) {
                    println!("No exercise {}.", index + 1);
                }
            }
            Command::Answers(values) => {
                for (index, value) in values.into_iter().enumerate() {
                    if !self.state.record_answer(index, value) {
                        println!("Ignoring answers past exercise {index}.");
                        break;
                    }
                }
            }
            Command::Check => self.check(),
            Command::Repeat => match self.state.repeat_batch() {
                Ok(()) => self.show(),
                Err(err) => println!("{err}"),
            },
            Command::Show => self.show(),
            Command::Profile => self.profile().await,
        }
        Ok(())
    }

    fn signed_out(&self) -> bool {
        match self.identity.ensure_signed_out() {
            Ok(()) => true,
            Err(err) => {
                println!("{err}");
                false
            }
        }
    }

    async fn sign_in(&mut self, result: Result<UserId, AuthError>) {
        let user_id = match result {
            Ok(user_id) => user_id,
            Err(err) => {
                println!("{err}");
                return;
            }
        };
        match self.identity.sign_in(user_id).await {
            Ok(_) => println!("Signed in."),
            Err(err) => println!("{err}"),
        }
    }

    async fn next_batch(&mut self) -> anyhow::Result<()> {
        let drill = self.services.drill();
        match drill.next_batch(&mut self.state, &self.request).await? {
            BatchStart::Applied { origin, .. } => {
                if let BatchOrigin::Fallback { reason } = origin {
                    println!("Exercise service unavailable ({reason}); using local exercises.");
                }
                self.show();
            }
            BatchStart::Stale { ticket } => debug!(ticket = ticket.value(), "batch superseded"),
        }
        Ok(())
    }

    async fn change_request(&mut self, mode: DrillMode, count: usize) -> anyhow::Result<()> {
        match BatchRequest::new(mode, count) {
            Ok(request) => {
                self.request = request;
                self.next_batch().await
            }
            Err(err) => {
                println!("{err}");
                Ok(())
            }
        }
    }

    fn check(&mut self) {
        let identity = self.identity.identity();
        let outcome = match self.services.drill().grade(&mut self.state, &identity) {
            Ok(outcome) => outcome,
            Err(err) => {
                println!("{err}");
                return;
            }
        };

        for ((exercise, correct), answer) in self
            .state
            .batch()
            .iter()
            .zip(outcome.score.per_item_correct())
            .zip(self.state.answers().as_slice())
        {
            let typed = answer.map_or_else(|| "-".to_owned(), |v| v.to_string());
            let mark = if *correct { "ok" } else { "wrong" };
            println!("  {exercise} = {typed:<4} {mark}");
        }
        println!(
            "Score: {}/{}. `next` for a new batch, `repeat` to retry.",
            outcome.score.correct_count(),
            outcome.score.total()
        );
        if let Some(handles) = outcome.persistence {
            self.pending.push(handles);
        }
    }

    fn show(&self) {
        if self.state.batch().is_empty() {
            println!("No batch yet; type `next`.");
            return;
        }
        for (i, exercise) in self.state.batch().iter().enumerate() {
            match self.state.answers().get(i) {
                Some(answer) => println!("{:>3}) {exercise} = {answer}", i + 1),
                None => println!("{:>3}) {exercise} = ?", i + 1),
            }
        }
    }

    async fn profile(&mut self) {
        // Let in-flight saves land so the numbers are current.
        self.flush().await;
        match self.services.profiles().profile(&self.identity.identity()).await {
            Ok(view) => {
                let profile = view.profile();
                println!(
                    "{} - level {}, total score {}",
                    profile.username, profile.level, profile.total_score
                );
                for achievement in &profile.achievements {
                    println!("  {}: {}", achievement.name, achievement.progress);
                }
                if matches!(view, ProfileView::Guest(_)) {
                    println!("  (guest progress is not saved)");
                }
            }
            Err(err) => {
                println!("{err}");
                return;
            }
        }

        let identity = self.identity.identity();
        match self.services.profiles().recent_scores(&identity, RECENT_RESULTS).await {
            Ok(recent) if recent.is_empty() => {}
            Ok(recent) => {
                let scores: Vec<String> = recent.iter().map(|r| r.score.to_string()).collect();
                println!("  recent results: {}", scores.join(", "));
            }
            Err(err) => warn!(error = %err, "cannot load recent results"),
        }
    }

    async fn flush(&mut self) {
        for handles in self.pending.drain(..) {
            let (score, achievement) = handles.join().await;
            debug!(?score, ?achievement, "result persisted");
        }
    }
}

async fn next_line(lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<Option<String>> {
    match lines.next_line().await {
        Ok(line) => Ok(line),
        Err(err) => {
            warn!(error = %err, "cannot read input");
            Err(err.into())
        }
    }
}
