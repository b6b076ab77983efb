use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;
use vocab_tutor::clients::{DashScopeTransport, MockResponse, MockTransport};
use vocab_tutor::quiz::quiz_schema_json;
use vocab_tutor::{
    AnswerLabel, CompletionTransport, Conversation, Difficulty, QuizPreset, QuizQuestion, QuizRequest, TutorClient,
    TutorConfig,
};

#[derive(Clone, Debug, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
enum PresetArg {
    Random,
    HighFrequency,
    Synonyms,
}

impl From<PresetArg> for QuizPreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Random => QuizPreset::Random,
            PresetArg::HighFrequency => QuizPreset::HighFrequency,
            PresetArg::Synonyms => QuizPreset::Synonyms,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "English vocabulary chat tutor and quiz generator", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    DASHSCOPE_API_KEY      API key for the completion service
    DASHSCOPE_CHAT_APP_ID  Application handling the chat tutor
    DASHSCOPE_QUIZ_APP_ID  Application generating quiz questions
    DASHSCOPE_BASE_URL     Override the API base URL
    RUST_LOG               Log filter (default: vocab_tutor=info)")]
struct Args {
    /// Answer from canned responses instead of the real service
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Talk to the tutor. `/reset` starts a new session, `/quit` exits
    Chat,
    /// Generate questions and answer them interactively
    Quiz {
        /// Number of questions (1-5)
        #[arg(short, long, default_value_t = 1)]
        count: u8,
        #[arg(short, long, value_enum, default_value = "medium")]
        difficulty: DifficultyArg,
        /// Use a canned requirement
        #[arg(short, long, value_enum)]
        preset: Option<PresetArg>,
        /// Free-form requirement, overrides --preset
        #[arg(short, long)]
        require: Option<String>,
    },
    /// Print the JSON schema of a quiz question
    Schema,
}

fn init_tracing() {
    // Load .env first so RUST_LOG in .env is seen
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vocab_tutor=info"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

const MOCK_QUESTION: &str = r#"```json
[{"题目": "Choose the word closest in meaning to 'diligent'.", "选项A": "lazy", "选项B": "hardworking", "选项C": "careless", "选项D": "noisy", "正确答案": "B", "解析": "'Diligent' means showing care and effort in one's work."}]
```"#;

fn mock_client(command: &Command) -> TutorClient<Box<dyn CompletionTransport>> {
    let (transport, handle) = MockTransport::new();
    match command {
        Command::Quiz { .. } => handle.set_fallback(MockResponse::success(MOCK_QUESTION, None)),
        _ => handle.set_fallback(MockResponse::success(
            "(mock) That's a great sentence! Try using **diligent** next.",
            Some("mock-session"),
        )),
    }
    let transport: Box<dyn CompletionTransport> = Box::new(transport);
    TutorClient::with_transport(TutorConfig::new("mock-key", "mock-chat", "mock-quiz"), transport)
}

fn live_client() -> Result<TutorClient<Box<dyn CompletionTransport>>> {
    let config = TutorConfig::from_env().context("loading configuration")?;
    let transport: Box<dyn CompletionTransport> = Box::new(DashScopeTransport::new());
    Ok(TutorClient::with_transport(config, transport))
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<String>> {
    Ok(lines.next_line().await?)
}

async fn run_chat<T: CompletionTransport>(client: &TutorClient<T>) -> Result<()> {
    let mut conversation = Conversation::new();
    let mut lines = BufReader::new(stdin()).lines();
    println!("Chat with your vocabulary tutor. /reset to start over, /quit to exit.");

    while let Some(line) = read_line(&mut lines).await? {
        match line.trim() {
            "/quit" => break,
            "/reset" => {
                conversation.clear(client);
                println!("-- new conversation --");
            }
            _ => match conversation.ask(client, &line).await {
                Ok(Some(reply)) => println!("{}\n", reply.content()),
                Ok(None) => {}
                Err(e) => eprintln!("Sorry, I encountered an error: {e}"),
            },
        }
    }
    Ok(())
}

fn print_question(index: usize, total: usize, question: &QuizQuestion) {
    println!("\nQuestion {}/{}", index + 1, total);
    println!("{}", question.question);
    for label in AnswerLabel::ALL {
        println!("  {}. {}", label, question.option(label));
    }
}

fn verdict(question: &QuizQuestion, chosen: AnswerLabel) -> String {
    if question.is_correct(chosen) {
        return "Correct!".to_string();
    }
    match question.answer_label() {
        Some(label) => format!("Wrong, the answer is {}.", label),
        // Show what the model actually sent rather than a guessed option
        None => format!("Wrong, the answer key is \"{}\".", question.correct_answer),
    }
}

async fn run_quiz<T: CompletionTransport>(client: &TutorClient<T>, request: QuizRequest) -> Result<()> {
    let questions = client.generate_quiz_for(&request).await.context("generating quiz")?;
    if questions.is_empty() {
        println!("No questions were generated, please try again.");
        return Ok(());
    }

    let mut lines = BufReader::new(stdin()).lines();
    let mut score = 0;
    for (i, question) in questions.iter().enumerate() {
        print_question(i, questions.len(), question);
        let chosen = loop {
            println!("Your answer (A-D):");
            let Some(line) = read_line(&mut lines).await? else {
                return Ok(());
            };
            match line.trim().to_uppercase().parse::<AnswerLabel>() {
                Ok(label) => break label,
                Err(e) => println!("{e}"),
            }
        };

        if question.is_correct(chosen) {
            score += 1;
        }
        println!("{}", verdict(question, chosen));
        println!("Explanation: {}", question.explanation);
    }
    println!("\nScore: {}/{}", score, questions.len());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    if let Command::Schema = args.command {
        println!("{}", quiz_schema_json()?);
        return Ok(());
    }

    let client = if args.mock { mock_client(&args.command) } else { live_client()? };

    match args.command {
        Command::Chat => run_chat(&client).await,
        Command::Quiz { count, difficulty, preset, require } => {
            let mut request = QuizRequest::new(count, difficulty.into());
            if let Some(preset) = preset {
                request = request.with_preset(preset.into());
            }
            if let Some(require) = require {
                request = request.with_requirement(require);
            }
            run_quiz(&client, request).await
        }
        Command::Schema => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(answer: &str) -> QuizQuestion {
        QuizQuestion {
            question: "Pick the synonym of 'rapid'".to_string(),
            option_a: "fast".to_string(),
            option_b: "slow".to_string(),
            option_c: "late".to_string(),
            option_d: "calm".to_string(),
            correct_answer: answer.to_string(),
            explanation: "'Rapid' means fast.".to_string(),
        }
    }

    #[test]
    fn verdict_names_the_correct_label() {
        assert_eq!(verdict(&question("A"), AnswerLabel::A), "Correct!");
        assert_eq!(verdict(&question("C"), AnswerLabel::A), "Wrong, the answer is C.");
    }

    #[test]
    fn verdict_shows_raw_key_for_unrecognised_label() {
        let q = question("E");
        // Index falls back to A, but A is not accepted, so it must not be named
        assert_eq!(verdict(&q, AnswerLabel::A), "Wrong, the answer key is \"E\".");
        assert_eq!(verdict(&q, AnswerLabel::B), "Wrong, the answer key is \"E\".");
    }
}
