//! Interactive assessment over stdin/stdout.
//!
//! Type an answer per question. `:diag` shows the current differential,
//! `:next` the upcoming questions, `:reset` starts over and `:quit` ends
//! the session. Logs go to stderr.

use std::error::Error;
use std::sync::Arc;

use secrecy::Secret;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clinical_assessment::adapters::{
    BuiltinCatalog, CatalogFile, FailoverQuestionAdvisor, HttpAdvisorConfig, HttpQuestionAdvisor,
    InMemorySessionStore, LocalQuestionAdvisor,
};
use clinical_assessment::application::{
    AssessmentContext, EndAssessmentCommand, EndAssessmentHandler, GetDiagnosticsHandler,
    GetDiagnosticsQuery, NextStep, PreviewQuestionsHandler, PreviewQuestionsQuery,
    ResetAssessmentCommand, ResetAssessmentHandler, StartAssessmentCommand,
    StartAssessmentHandler, SubmitAnswerCommand, SubmitAnswerHandler,
};
use clinical_assessment::config::{AppConfig, LoggingConfig};
use clinical_assessment::domain::assessment::{
    Answer, AssessmentOutcome, ConversationManager, DiagnosticsSnapshot,
};
use clinical_assessment::domain::foundation::SessionId;
use clinical_assessment::domain::knowledge::{PromptType, QuestionTemplate, SCALE_MAX};
use clinical_assessment::ports::{KnowledgeBaseSource, QuestionAdvisor};

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.logging)?;

    let source: Box<dyn KnowledgeBaseSource> = match config.knowledge.catalog_file() {
        Some(path) => Box::new(CatalogFile::new(path.clone())),
        None => Box::new(BuiltinCatalog),
    };
    let knowledge_base = Arc::new(source.load()?);
    tracing::info!(
        source = %source.describe(),
        conditions = knowledge_base.conditions().len(),
        questions = knowledge_base.questions().len(),
        "Knowledge base ready"
    );

    let context = AssessmentContext::new(
        knowledge_base,
        Arc::new(InMemorySessionStore::new()),
        build_advisor(&config)?,
        ConversationManager::new(
            config.engine.selector_config(),
            config.engine.completeness_config(),
        ),
    );

    Dialogue::new(context, config.features.show_differential, config.features.verbose_errors)
        .run()
        .await
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), BoxError> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.filter))?;
    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

fn build_advisor(config: &AppConfig) -> Result<Arc<dyn QuestionAdvisor>, BoxError> {
    let local = LocalQuestionAdvisor::new(config.engine.selector_config());
    let advisory = &config.advisory;
    let Some(endpoint) = advisory.endpoint.as_deref().filter(|_| advisory.enabled) else {
        return Ok(Arc::new(local));
    };

    let mut http_config = HttpAdvisorConfig::new(endpoint)
        .with_timeout(advisory.timeout())
        .with_top_k(config.engine.top_k);
    if let Some(key) = advisory.api_key.clone().filter(|_| advisory.has_api_key()) {
        http_config = http_config.with_api_key(Secret::new(key));
    }

    let remote = HttpQuestionAdvisor::new(http_config)?;
    tracing::info!(endpoint, "Remote advisor enabled");
    Ok(Arc::new(
        FailoverQuestionAdvisor::new(remote)
            .with_fallback(local)
            .with_timeout(advisory.timeout()),
    ))
}

/// One interactive assessment.
struct Dialogue {
    context: AssessmentContext,
    show_differential: bool,
    verbose_errors: bool,
    out: Stdout,
}

impl Dialogue {
    fn new(context: AssessmentContext, show_differential: bool, verbose_errors: bool) -> Self {
        Self {
            context,
            show_differential,
            verbose_errors,
            out: tokio::io::stdout(),
        }
    }

    async fn run(mut self) -> Result<(), BoxError> {
        let started = StartAssessmentHandler::new(self.context.clone())
            .handle(StartAssessmentCommand)
            .await?;
        let session_id = started.session_id;
        let mut question = started.question;
        self.ask(&question).await?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            match line {
                "" => continue,
                ":quit" => break,
                ":diag" => {
                    let snapshot = self.diagnostics(session_id).await?;
                    self.print_diagnostics(&snapshot).await?;
                }
                ":next" => self.preview(session_id).await?,
                ":reset" => {
                    question = ResetAssessmentHandler::new(self.context.clone())
                        .handle(ResetAssessmentCommand { session_id })
                        .await?
                        .question;
                    self.say("Assessment restarted.").await?;
                }
                answer => {
                    let cmd = SubmitAnswerCommand {
                        session_id,
                        question_id: question.id.clone(),
                        answer: Answer::text(answer),
                    };
                    match SubmitAnswerHandler::new(self.context.clone()).handle(cmd).await {
                        Ok(result) => match result.next {
                            NextStep::Ask(next) => {
                                question = next;
                                if self.show_differential {
                                    let snapshot = self.diagnostics(session_id).await?;
                                    self.print_diagnostics(&snapshot).await?;
                                }
                            }
                            NextStep::Finished(outcome) => {
                                self.print_outcome(&outcome).await?;
                                break;
                            }
                        },
                        Err(err) if self.verbose_errors => self.say(&format!("Error: {}", err)).await?,
                        Err(err) => self.say(&format!("Could not record answer ({}).", err.code())).await?,
                    }
                }
            }
            self.ask(&question).await?;
        }

        EndAssessmentHandler::new(self.context.clone())
            .handle(EndAssessmentCommand { session_id })
            .await?;
        Ok(())
    }

    async fn ask(&mut self, question: &QuestionTemplate) -> Result<(), BoxError> {
        let hint = match question.prompt_type {
            PromptType::YesNo => "(yes/no)".to_string(),
            PromptType::NumericScale => format!("(0-{})", SCALE_MAX),
            PromptType::SingleChoice => format!("[{}]", question.options.join(" | ")),
            PromptType::MultiChoice => format!("[{}] comma separated", question.options.join(" | ")),
            PromptType::FreeText => String::new(),
        };
        self.say(&format!("\n{} {}", question.prompt, hint)).await?;
        self.out.write_all(b"> ").await?;
        self.out.flush().await?;
        Ok(())
    }

    async fn diagnostics(&self, session_id: SessionId) -> Result<DiagnosticsSnapshot, BoxError> {
        Ok(GetDiagnosticsHandler::new(self.context.clone())
            .handle(GetDiagnosticsQuery { session_id })
            .await?)
    }

    async fn preview(&mut self, session_id: SessionId) -> Result<(), BoxError> {
        let previews = PreviewQuestionsHandler::new(self.context.clone())
            .handle(PreviewQuestionsQuery {
                session_id,
                count: 5,
            })
            .await?;
        for preview in previews {
            self.say(&format!("  - {}", preview.question.prompt)).await?;
        }
        Ok(())
    }

    async fn print_diagnostics(&mut self, snapshot: &DiagnosticsSnapshot) -> Result<(), BoxError> {
        self.say(&format!(
            "Completion {} | confidence {:?} | answered {}",
            snapshot.completion_percentage, snapshot.confidence, snapshot.answered_count
        ))
        .await?;
        for condition in &snapshot.top_conditions {
            self.say(&format!("  {:>5.1}%  {}", condition.posterior * 100.0, condition.name))
                .await?;
        }
        if let Some(urgency) = snapshot.urgency {
            self.say(&format!("  Red flags ({}): {}", urgency, snapshot.red_flags.len()))
                .await?;
        }
        Ok(())
    }

    async fn print_outcome(&mut self, outcome: &AssessmentOutcome) -> Result<(), BoxError> {
        match outcome {
            AssessmentOutcome::Referral(referral) => {
                self.say(&format!("\n{}", referral.message)).await?;
            }
            AssessmentOutcome::Diagnosis(diagnosis) => {
                self.say(&format!(
                    "\nAssessment complete ({}, confidence {:?}).",
                    diagnosis.completion, diagnosis.confidence
                ))
                .await?;
                for (rank, condition) in diagnosis.ranked.iter().enumerate() {
                    self.say(&format!(
                        "  {}. {} ({:.1}%)",
                        rank + 1,
                        condition.name,
                        condition.posterior * 100.0
                    ))
                    .await?;
                }
                if !diagnosis.missing_critical.is_empty() {
                    let missing: Vec<String> =
                        diagnosis.missing_critical.iter().map(|c| c.to_string()).collect();
                    self.say(&format!("  Not fully covered: {}", missing.join(", ")))
                        .await?;
                }
            }
        }
        Ok(())
    }

    async fn say(&mut self, text: &str) -> Result<(), BoxError> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }
}
