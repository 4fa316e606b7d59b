use crate::state::{CallSummary, SummaryCritique};

// 系统提示词与用户消息构建

pub const ABUSE_SYSTEM: &str = "You are a content moderation system for call center transcripts. \
Flag inappropriate content for review.\n\
Categories: profanity, threat, harassment, sexual, hate_speech.\n\
Severity 1-10: 1-3 mild, 4-6 moderate or legal threats, 7-10 severe or physical threats.\n\
Normal frustration is not abuse unless it includes profanity, threats, or personal attacks.\n\
For each finding output:\n\
TYPE: [category]\nSEVERITY: [number 1-10]\nTEXT: \"[exact quote from transcript]\"\nCONTEXT: [brief explanation]\n\
If nothing is found respond with: NO_ABUSE_DETECTED";

pub const SUMMARY_SYSTEM: &str = "You are an expert call center analyst. \
Summarize the transcript as a JSON object with keys: \
brief_summary (2-3 sentences), key_points (3-5 strings), action_items (strings), \
customer_intent, sentiment (positive|neutral|negative), \
resolution_status (resolved|unresolved|escalated), topics (strings). \
Use only facts from the transcript.";

pub const CRITIC_SYSTEM: &str = "You are an expert quality evaluator for call center summaries. \
Score the summary against the transcript from 1 to 10 on faithfulness, completeness and conciseness. \
Respond with a JSON object with keys: faithfulness_score, completeness_score, conciseness_score, \
feedback, revision_instructions (specific and actionable, null when no revision is needed).";

pub const QA_SYSTEM: &str = "You are an expert call center quality analyst. \
Score the agent from 0 to 10 on empathy, professionalism, resolution and tone. \
Respond with a JSON object with keys: empathy, professionalism, resolution, tone, comments.";

pub fn abuse_user(transcript: &str) -> String {
    format!(
        "Analyze this call transcript for abusive content:\n\n{}\n\nList any abuse detected:",
        transcript
    )
}

pub fn summary_user(transcript: &str, prior: Option<&SummaryCritique>) -> String {
    let mut prompt = format!("Please analyze this call transcript:\n\n{}", transcript);
    if let Some(critique) = prior {
        prompt.push_str("\n\nA reviewer rejected the previous summary.\nFeedback: ");
        prompt.push_str(&critique.feedback);
        if let Some(instructions) = &critique.revision_instructions {
            prompt.push_str("\nRevision instructions: ");
            prompt.push_str(instructions);
        }
        prompt.push_str("\nAddress these points in the new summary.");
    }
    prompt
}

pub fn critic_user(transcript: &str, summary: &CallSummary) -> String {
    let action_items = if summary.action_items.is_empty() {
        "None".to_string()
    } else {
        summary.action_items.join(", ")
    };
    format!(
        "Original transcript:\n{}\n\nCurrent summary:\nBrief: {}\nKey points: {}\nAction items: {}\n\
Customer intent: {}\nSentiment: {}\nResolution: {}\nTopics: {}\n\nEvaluate this summary.",
        transcript,
        summary.brief_summary,
        summary.key_points.join(", "),
        action_items,
        summary.customer_intent,
        summary.sentiment.as_str(),
        summary.resolution_status.as_str(),
        summary.topics.join(", ")
    )
}

pub fn qa_user(transcript: &str) -> String {
    format!(
        "Please evaluate this call transcript:\n\n{}\n\nProvide scores and detailed comments.",
        transcript
    )
}
