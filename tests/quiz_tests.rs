
use serde_json::{json, Value};
use test_utils::{mock_tutor, question_json};
use vocab_tutor::clients::MockResponse;
use vocab_tutor::quiz::quiz_schema_json;
use vocab_tutor::{AnswerLabel, ApiError, Difficulty, QuizPreset, QuizQuestion, QuizRequest};

fn question(answer: &str) -> QuizQuestion {
    serde_json::from_value(question_json(0, answer)).unwrap()
}

#[tokio::test]
async fn fenced_array_yields_every_question() {
    for n in 1..=5 {
        let array = Value::Array((1..=n).map(|i| question_json(i, "B")).collect());
        let text = format!("\n  ```json\n{}\n```  \n", serde_json::to_string_pretty(&array).unwrap());
        let (tutor, _) = mock_tutor(vec![MockResponse::success(text, None)]);

        let questions = tutor.generate_quiz("quiz").await.unwrap();
        assert_eq!(questions.len(), n);
        for (i, q) in questions.iter().enumerate() {
            let expected: QuizQuestion = serde_json::from_value(question_json(i + 1, "B")).unwrap();
            assert_eq!(q, &expected);
        }
    }
}

#[tokio::test]
async fn single_object_becomes_one_element_sequence() {
    let text = format!("```\n{}\n```", question_json(7, "C"));
    let (tutor, _) = mock_tutor(vec![MockResponse::success(text, None)]);

    let questions = tutor.generate_quiz("quiz").await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].question, "Question 7: pick the synonym of 'rapid'");
    assert_eq!(questions[0].options(), ["fast 7", "slow 7", "late 7", "calm 7"]);
    assert_eq!(questions[0].correct_index(), 2);
    assert_eq!(questions[0].explanation, "Explanation 7");
}

#[tokio::test]
async fn prose_is_parsing_error() {
    let (tutor, _) = mock_tutor(vec![
        MockResponse::success("Sorry, I can't make a quiz right now.", None),
        MockResponse::success("```json\n```", None),
        MockResponse::success("Here you go: [{\"题目\": \"x\"}]", None),
    ]);

    for _ in 0..3 {
        assert_eq!(tutor.generate_quiz("quiz").await.unwrap_err(), ApiError::Parsing);
    }
}

#[tokio::test]
async fn one_malformed_element_fails_the_whole_array() {
    let mut broken = question_json(2, "A");
    broken.as_object_mut().unwrap().remove("解析");
    let text = json!([question_json(1, "A"), broken]).to_string();
    let (tutor, _) = mock_tutor(vec![MockResponse::success(text, None)]);

    assert_eq!(tutor.generate_quiz("quiz").await.unwrap_err(), ApiError::Parsing);
}

#[tokio::test]
async fn quiz_transport_errors_pass_through() {
    let (tutor, _) = mock_tutor(vec![MockResponse::json(400, json!({"message": "InvalidParameter"}))]);
    assert_eq!(
        tutor.generate_quiz("quiz").await.unwrap_err(),
        ApiError::Api("InvalidParameter".to_string())
    );
}

#[tokio::test]
async fn generate_quiz_for_sends_rendered_prompt() {
    let (tutor, handle) = mock_tutor(vec![MockResponse::success(question_json(1, "A").to_string(), None)]);
    let request = QuizRequest::new(3, Difficulty::Hard).with_preset(QuizPreset::Synonyms);

    tutor.generate_quiz_for(&request).await.unwrap();
    assert_eq!(
        handle.last_request().unwrap().prompt(),
        Some("请生成3道困难难度的英语词汇选择题，要求：请出近义词辨析的题目")
    );
}

#[test]
fn label_to_index_mapping() {
    assert_eq!(question("A").correct_index(), 0);
    assert_eq!(question("B").correct_index(), 1);
    assert_eq!(question("C").correct_index(), 2);
    assert_eq!(question("D").correct_index(), 3);
    for other in ["E", "a", "", "B.", "选项B"] {
        assert_eq!(question(other).correct_index(), 0, "label {other:?}");
        assert_eq!(question(other).answer_label(), None);
    }
}

#[test]
fn answer_checking_compares_labels() {
    let q = question("D");
    assert!(q.is_correct(AnswerLabel::D));
    assert!(!q.is_correct(AnswerLabel::A));
    assert_eq!(q.option(AnswerLabel::B), "slow 0");

    // An unrecognised label never matches, even though its index defaults to A
    let odd = question("X");
    assert!(AnswerLabel::ALL.iter().all(|l| !odd.is_correct(*l)));
}

#[test]
fn answer_label_parsing() {
    assert_eq!("C".parse::<AnswerLabel>().unwrap(), AnswerLabel::C);
    let err = "Z".parse::<AnswerLabel>().unwrap_err();
    assert!(err.to_string().contains("'Z'"));
}

#[test]
fn prompt_rendering() {
    assert_eq!(QuizRequest::default().render_prompt(), "请生成1道中等难度的英语词汇选择题");
    assert_eq!(
        QuizRequest::new(2, Difficulty::Easy).with_requirement("关于 practice 的题目").render_prompt(),
        "请生成2道简单难度的英语词汇选择题，要求：关于 practice 的题目"
    );
    assert_eq!(
        QuizRequest::new(1, Difficulty::Medium).with_requirement("   ").render_prompt(),
        "请生成1道中等难度的英语词汇选择题"
    );
    assert_eq!(
        QuizRequest::new(1, Difficulty::Medium)
            .with_preset(QuizPreset::HighFrequency)
            .render_prompt(),
        "请生成1道中等难度的英语词汇选择题，要求：请出关于高频词汇的题目"
    );
    assert_eq!(QuizRequest::default().with_preset(QuizPreset::Random).requirement, None);
}

#[test]
fn count_is_clamped() {
    assert_eq!(QuizRequest::new(0, Difficulty::Easy).count(), 1);
    assert_eq!(QuizRequest::new(9, Difficulty::Easy).count(), 5);
    assert_eq!(QuizRequest::new(4, Difficulty::Easy).count(), 4);
}

#[test]
fn schema_uses_wire_field_names() {
    let schema = quiz_schema_json().unwrap();
    for field in ["题目", "选项A", "选项B", "选项C", "选项D", "正确答案", "解析"] {
        assert!(schema.contains(field), "schema missing {field}");
    }
}
