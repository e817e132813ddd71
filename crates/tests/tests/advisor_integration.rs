use std::io::Write;
use std::sync::Arc;
use std::thread;

use anyhow::Result;

use finch_agents::{FinanceAdvisor, APOLOGY_MESSAGE};
use finch_core::{
    classify_intent, compose_response, Category, Intent, KnowledgeBase, ReplyRoute,
    PARAGRAPH_BREAK,
};
use finch_observability::AppMetrics;
use finch_tests::{profile, seeded_advisor};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn working_professional_savings_question_end_to_end() -> Result<()> {
    let (advisor, _) = seeded_advisor(42);
    let user = profile("working professional", 35, 5000.0, &["Build Emergency Fund"]);

    let text = advisor.respond("How much should I save?", &user)?;

    let body = text
        .strip_prefix("For a working professional like you, ")
        .expect("professional prefix");
    let paragraphs: Vec<_> = body.split(PARAGRAPH_BREAK).collect();
    assert_eq!(paragraphs.len(), 3);

    let entries = KnowledgeBase::builtin().advice(Category::Savings, "working professional");
    assert_eq!(entries.len(), 5);
    assert!(entries.iter().any(|entry| entry == paragraphs[0]));
    assert_eq!(
        paragraphs[1],
        "💡 With $5,000/month income, try to save $300-600 monthly (10-20% of income)."
    );
    assert!(text.ends_with(
        "🎯 I see you're focused on 'Build Emergency Fund' - this advice should help with that goal!"
    ));
    Ok(())
}

#[test]
fn quick_response_wins_over_classification() -> Result<()> {
    let (advisor, metrics) = seeded_advisor(1);
    let user = profile("alien", 30, 0.0, &[]);

    let answered = advisor.handle_message("I want to invest in a 401k", &user)?;
    assert_eq!(
        answered.reply.route,
        ReplyRoute::QuickResponse {
            keyword: "401k".to_string()
        }
    );
    assert!(answered
        .reply
        .text
        .starts_with("A 401(k) is an employer-sponsored retirement account."));

    // Without the quick-response shortcut the same text routes to investing.
    assert_eq!(classify_intent("I want to invest in a 401k"), Intent::Investing);
    assert_eq!(metrics.snapshot().quick_responses_total, 1);
    Ok(())
}

#[test]
fn unmatched_message_routes_to_general_tip() {
    let (advisor, metrics) = seeded_advisor(5);
    let user = profile("retiree", 70, 0.0, &[]);

    let answered = advisor.handle_message("I like turtles", &user).unwrap();
    assert_eq!(answered.reply.route, ReplyRoute::Advice { intent: Intent::General });

    let tip = answered.reply.text.strip_prefix("In retirement, ").unwrap();
    assert!(KnowledgeBase::builtin()
        .general_tips()
        .iter()
        .any(|entry| entry == tip));
    assert_eq!(metrics.snapshot().general_fallback_total, 1);
}

#[test]
fn student_debt_question_gets_two_paragraphs_and_goal_suffix() {
    let (advisor, _) = seeded_advisor(9);
    let user = profile("Student", 21, 0.0, &["Pay Off Debt", "Save for House", "Tax Planning"]);

    let text = advisor.respond("How do I pay off my loans?", &user).unwrap();
    let body = text.strip_prefix("As a student, ").unwrap();
    let paragraphs: Vec<_> = body.split(PARAGRAPH_BREAK).collect();

    assert_eq!(paragraphs.len(), 3);
    assert_eq!(
        paragraphs[2],
        "🎯 This aligns well with your goals of Pay Off Debt, Save for House!"
    );
    assert!(!text.contains("Tax Planning"));
}

#[test]
fn same_seed_reproduces_a_conversation() -> Result<()> {
    let user = profile("recent graduate", 24, 2500.0, &[]);
    let questions = [
        "how should I budget",
        "what stocks should I buy",
        "when should I retire",
        "my student loan is huge",
        "",
    ];

    let (first, _) = seeded_advisor(2024);
    let (second, _) = seeded_advisor(2024);
    for question in questions {
        assert_eq!(first.respond(question, &user)?, second.respond(question, &user)?);
    }
    Ok(())
}

#[test]
fn caller_supplied_rng_makes_selection_deterministic() -> Result<()> {
    let user = profile("entrepreneur", 40, 0.0, &["Budget Better"]);
    let kb = KnowledgeBase::builtin();

    let a = compose_response(kb, "budget help", &user, &mut StdRng::seed_from_u64(3))?;
    let b = compose_response(kb, "budget help", &user, &mut StdRng::seed_from_u64(3))?;
    assert_eq!(a, b);
    assert!(a.text.starts_with("As an entrepreneur, "));
    assert!(a.text.contains("Since budgeting is one of your goals"));
    Ok(())
}

#[test]
fn one_advisor_serves_many_threads() {
    let advisor = Arc::new(FinanceAdvisor::with_builtin(AppMetrics::shared(), Some(8)));
    let user = profile("student", 19, 1200.0, &[]);

    thread::scope(|scope| {
        for _ in 0..4 {
            let advisor = Arc::clone(&advisor);
            let user = user.clone();
            scope.spawn(move || {
                for _ in 0..25 {
                    let text = advisor.respond("should I save or invest?", &user).unwrap();
                    assert!(text.starts_with("As a student, "));
                }
            });
        }
    });

    assert_eq!(advisor.metrics().snapshot().requests_total, 100);
}

#[test]
fn malformed_profile_gets_apology() {
    let (advisor, metrics) = seeded_advisor(4);
    let user = profile("student", -4, 0.0, &[]);

    assert_eq!(
        advisor.respond_or_apologize("what about retirement?", &user),
        APOLOGY_MESSAGE
    );
    assert_eq!(metrics.snapshot().rejected_profiles_total, 1);
}

#[test]
fn custom_knowledge_base_file_drives_advice() -> Result<()> {
    let mut value: serde_json::Value =
        serde_json::from_str(&KnowledgeBase::builtin().to_json_pretty()?)?;
    value["general_tips"] = serde_json::json!(["Spend less than you earn."]);

    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(value.to_string().as_bytes())?;

    let kb = KnowledgeBase::from_json_file(file.path())?;
    let advisor = FinanceAdvisor::new(Arc::new(kb), AppMetrics::shared(), Some(1));

    let text = advisor.respond("I like turtles", &profile("alien", 30, 0.0, &[]))?;
    assert_eq!(text, "Spend less than you earn.");
    Ok(())
}

#[test]
fn answered_reply_serializes_route_and_timestamp() -> Result<()> {
    let (advisor, _) = seeded_advisor(6);
    let answered =
        advisor.handle_message("what is my credit score?", &profile("student", 20, 0.0, &[]))?;

    let json = serde_json::to_value(&answered)?;
    assert_eq!(json["route"]["kind"], "quick_response");
    assert_eq!(json["route"]["keyword"], "credit score");
    assert!(json["text"].as_str().unwrap().starts_with("As a student, "));
    assert!(json.get("answered_at").is_some());
    Ok(())
}
