use clap::Args;
use profile_intake::error::AppError;
use profile_intake::lifecycle::{
    spawn_worker, CompletionOutcome, CompletionRunner, DocumentUpload, InMemoryIntakeRepository,
    IntakeService, MemoryDocumentStore, NewProfile, ProcessingPolicy, SubmissionStatus,
    UploadLimits,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Simulated processing delay in milliseconds
    #[arg(long, default_value_t = 250)]
    pub(crate) delay_ms: u64,
    /// Drive the simulated processing to a rejection instead of completion
    #[arg(long)]
    pub(crate) reject: bool,
}

/// Walk the full submission lifecycle in-process: profile, upload, submit,
/// and the asynchronous terminal transition.
pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let repository = Arc::new(InMemoryIntakeRepository::default());
    let documents = Arc::new(MemoryDocumentStore::default());
    let (runner, receiver) = CompletionRunner::channel();
    let service = Arc::new(IntakeService::new(
        repository,
        documents,
        Arc::new(runner),
        UploadLimits::from_megabytes(10),
    ));
    let outcome = if args.reject {
        CompletionOutcome::Reject
    } else {
        CompletionOutcome::Complete
    };
    let _worker = spawn_worker(
        receiver,
        service.clone(),
        ProcessingPolicy {
            delay: Duration::from_millis(args.delay_ms),
            outcome,
        },
    );

    println!("Profile Intake Lifecycle Demo");
    println!("=============================");

    let profile = service.create_profile(NewProfile {
        first_name: "John".to_string(),
        last_name: "Smith".to_string(),
        email: "john@test.com".to_string(),
        github_url: Some("https://github.com/johnsmith".to_string()),
    })?;
    println!(
        "created profile {} ({} {})",
        profile.id, profile.first_name, profile.last_name
    );

    let submission = service.create_submission(
        profile.id,
        DocumentUpload {
            filename: Some("resume.pdf".to_string()),
            content_type: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.4\n%demo document\n".to_vec(),
        },
    )?;
    println!(
        "uploaded submission {} -> {} (locked: {})",
        submission.id, submission.status, submission.locked
    );

    let submitted = service.submit(&submission.id)?;
    println!(
        "submitted submission {} -> {} (locked: {})",
        submitted.id, submitted.status, submitted.locked
    );

    let terminal = loop {
        let current = service.get_status(&submission.id)?;
        if current.status.is_terminal() {
            break current;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    };
    println!(
        "processing finished: {} -> {} (locked: {})",
        terminal.id, terminal.status, terminal.locked
    );

    match terminal.status {
        SubmissionStatus::Completed => println!("outcome: document accepted"),
        SubmissionStatus::Rejected => println!("outcome: document rejected"),
        other => println!("outcome: unexpected status {other}"),
    }

    Ok(())
}
