use std::sync::Once;

use vocab_tutor::{Difficulty, QuizRequest, TutorClient, TutorConfig};

fn init_tracing() {
    static START: Once = Once::new();
    START.call_once(|| {
        // Load .env first so RUST_LOG in .env is seen
        let _ = dotenvy::dotenv();
        let filter = if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::EnvFilter::from_default_env()
        } else {
            tracing_subscriber::EnvFilter::new("vocab_tutor=debug")
        };

        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .without_time()
            .with_env_filter(filter)
            .try_init();
    });
}

#[tokio::test]
#[ignore]
async fn live_chat_keeps_session() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let tutor = TutorClient::new(TutorConfig::from_env()?);

    let first = tutor.send_message("My favourite word is 'serendipity'. Remember it.").await?;
    println!("[live_chat_keeps_session] first reply: {first}");
    assert!(tutor.executor().session_id().is_some());

    let second = tutor.send_message("What is my favourite word?").await?;
    println!("[live_chat_keeps_session] second reply: {second}");
    assert!(second.to_lowercase().contains("serendipity"));
    Ok(())
}

#[tokio::test]
#[ignore]
async fn live_quiz_returns_questions() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let tutor = TutorClient::new(TutorConfig::from_env()?);

    let questions = tutor.generate_quiz_for(&QuizRequest::new(2, Difficulty::Easy)).await?;
    println!("[live_quiz_returns_questions] got {} questions", questions.len());
    assert!(!questions.is_empty());
    for q in &questions {
        assert!(q.answer_label().is_some(), "unexpected label {:?}", q.correct_answer);
    }
    Ok(())
}
