use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use coach_client::api::{CoachApi, Credentials, HttpCoachApi, Role};
use coach_client::config::ClientConfig;
use coach_client::diagnostic::{Competency, DiagnosticAdvance, DiagnosticFlow, DiagnosticResult, Reconciliation};
use coach_client::error::Error;
use coach_client::flow::{Ignored, Navigation, Step, StepKind, TransitionTimer};
use coach_client::onboarding::{KpiMode, OnboardingTutorial};
use coach_client::redirect::RedirectPolicy;
use coach_client::session::{FileTokenStore, SessionController, SessionEvent};

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ClientConfig::from_env().context("Invalid COACH_* configuration")?;

    eprintln!("🎯 Coach client v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", config.api_base_url);
    eprintln!("   Token: {}\n", config.token_path.display());

    let tokens = Arc::new(FileTokenStore::new(&config.token_path));
    let api: Arc<dyn CoachApi> = Arc::new(HttpCoachApi::new(&config, tokens.clone())?);
    let session = Arc::new(SessionController::new(api.clone(), tokens));
    let timer = TransitionTimer::new(config.transition_delay);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    if !session.check_auth().await.is_authenticated() && !sign_in(&session, &mut input).await? {
        return Ok(());
    }

    let snapshot = session.snapshot();
    let Some(user) = snapshot.user.clone() else {
        return Ok(());
    };
    eprintln!("Signed in as {} ({})", user.display_name(), user.role);

    if snapshot.requires_diagnostic() {
        run_diagnostic(api, session.clone(), timer, &mut input).await?;
    } else {
        let mode = std::env::var("COACH_KPI_MODE")
            .map(|code| KpiMode::from_code(&code))
            .unwrap_or_default();
        run_onboarding(user.role, mode, timer, &mut input).await?;
    }

    let return_to = std::env::var("COACH_RETURN_TO").ok();
    match RedirectPolicy::from_config(&config).resolve(return_to.as_deref().unwrap_or("/dashboard")) {
        Some(link) => eprintln!("Continue on the web: {link}"),
        None if return_to.is_some() => {
            tracing::warn!(return_to = ?return_to, "Return link rejected by redirect policy");
        }
        None => {}
    }

    Ok(())
}

/// Prompt until a sign-in succeeds. Returns `false` on end of input.
async fn sign_in(session: &SessionController, input: &mut Input) -> anyhow::Result<bool> {
    loop {
        let Some(email) = prompt(input, "Email: ").await? else {
            return Ok(false);
        };
        let Some(password) = prompt(input, "Password: ").await? else {
            return Ok(false);
        };

        match session.sign_in(&Credentials::new(email, password)).await {
            Ok(SessionEvent::ReloadDashboard) => {
                // The dashboard always starts from a fresh resolution.
                return Ok(session.check_auth().await.is_authenticated());
            }
            Ok(SessionEvent::ShowLogin { .. }) => eprintln!("Session expired, please sign in again."),
            Err(Error::Api(e)) => eprintln!("❌ {}", e.user_message()),
            Err(e) => return Err(e.into()),
        }
    }
}

async fn run_diagnostic(
    api: Arc<dyn CoachApi>,
    session: Arc<SessionController>,
    timer: TransitionTimer,
    input: &mut Input,
) -> anyhow::Result<()> {
    let flow = DiagnosticFlow::new(api, session, timer)?;
    eprintln!(
        "Before you start: {} questions about how you sell. Type 'back' to return to the previous one.",
        flow.engine().total()
    );

    loop {
        let engine = flow.engine();
        let step = engine.current_step().clone();
        render_step(&step, engine.current_index(), engine.total());

        let Some(line) = prompt(input, "> ").await? else {
            flow.exit();
            return Ok(());
        };
        if line.eq_ignore_ascii_case("back") {
            flow.retreat().await;
            continue;
        }

        if step.kind != StepKind::Informational {
            let Some(answer) = parse_answer(&step, line) else {
                eprintln!("Pick a number between 1 and {}.", step.options.len());
                continue;
            };
            if let Err(reason) = flow.record_answer(&step.id, answer) {
                eprintln!("Answer not accepted ({reason}).");
                continue;
            }
        }

        match flow.advance().await {
            DiagnosticAdvance::Navigated(Navigation::Ignored(Ignored::AnswerMissing)) => {
                eprintln!("This question needs an answer.");
            }
            DiagnosticAdvance::Navigated(_) => {}
            DiagnosticAdvance::Submitted {
                result,
                reconciliation,
            } => {
                print_result(&result);
                if matches!(reconciliation, Reconciliation::Pending | Reconciliation::Failed(_)) {
                    eprintln!("(Your final profile will be available on the dashboard shortly.)");
                }
                return Ok(());
            }
            DiagnosticAdvance::SubmissionFailed(e) if e.is_retryable() => {
                eprintln!("❌ {e}. Your answers are kept, answer the last question again to retry.");
            }
            DiagnosticAdvance::SubmissionFailed(e) => {
                eprintln!("❌ {e}. Please sign in again.");
                return Ok(());
            }
        }
    }
}

async fn run_onboarding(
    role: Role,
    mode: KpiMode,
    timer: TransitionTimer,
    input: &mut Input,
) -> anyhow::Result<()> {
    let tour = OnboardingTutorial::new(role, mode, timer)?;

    while !tour.is_complete() {
        let engine = tour.engine();
        render_step(tour.current_step(), engine.current_index(), engine.total());

        let Some(line) = prompt(input, "[Enter] next · back · skip · <n> jump > ").await? else {
            tour.skip();
            return Ok(());
        };
        match line.as_str() {
            "" | "next" => {
                tour.advance().await;
            }
            "back" => {
                tour.back().await;
            }
            "skip" => {
                tour.skip();
                eprintln!("Tour skipped. You can replay it from the settings page.");
                return Ok(());
            }
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 => {
                    if tour.go_to(n - 1).is_ignored() {
                        eprintln!("Step {n} is not available yet.");
                    }
                }
                _ => eprintln!("Unknown command: {other}"),
            },
        }
    }

    eprintln!("✅ Tour complete.");
    Ok(())
}

async fn prompt(input: &mut Input, label: &str) -> anyhow::Result<Option<String>> {
    eprint!("{label}");
    let line = input.next_line().await.context("Failed to read stdin")?;
    Ok(line.map(|l| l.trim().to_string()))
}

/// Choice answers are typed as 1-based option numbers.
fn parse_answer(step: &Step, line: String) -> Option<String> {
    match step.kind {
        StepKind::Choice => line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| step.options.get(i))
            .cloned(),
        _ => Some(line),
    }
}

fn render_step(step: &Step, index: usize, total: usize) {
    println!();
    match (&step.icon, &step.title) {
        (Some(icon), Some(title)) => println!("[{}/{}] {icon} {title}", index + 1, total),
        (None, Some(title)) => println!("[{}/{}] {title}", index + 1, total),
        _ => println!("[{}/{}]", index + 1, total),
    }
    println!("{}", step.prompt);
    for (i, option) in step.options.iter().enumerate() {
        println!("  {}. {option}", i + 1);
    }
    if let Some(ref tip) = step.tip {
        println!("  💡 {tip}");
    }
}

fn print_result(result: &DiagnosticResult) {
    println!("\nYour diagnostic");
    if let Some(ref profile) = result.profile {
        println!("  Profile: {profile}");
    }
    for competency in Competency::ALL {
        if let Some(score) = result.score(competency) {
            println!("  {:<24} {score:.1}/5", competency.label());
        }
    }
    if !result.recommendation.is_empty() {
        println!("\n{}", result.recommendation);
    }
}
