//! Agent definitions for the three pipeline stages.
//!
//! Each stage is an agent persona (role, goal, backstory) plus a task
//! (description, expected output). Text fields may contain the placeholders
//! `{topic}`, `{keywords}`, `{bullet_points}` and `{length}`, which are
//! resolved from the [`BlogInputs`] before the stage runs.

use pipeline::{BlogInputs, Stage};

/// Persona and task text for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePrompt {
    /// Agent role, e.g. "Senior Content Editor".
    pub role: &'static str,
    /// What the agent is trying to achieve.
    pub goal: &'static str,
    /// Persona background.
    pub backstory: &'static str,
    /// The task itself.
    pub description: &'static str,
    /// What a finished answer looks like.
    pub expected_output: &'static str,
}

const PLANNER: StagePrompt = StagePrompt {
    role: "Strategic Content Planner",
    goal: "Develop a comprehensive, data-driven content strategy that engages the target \
audience and provides unique insights on {topic}",
    backstory: "You are an expert content strategist with years of experience in digital \
content planning. You are good at spotting trending angles, understanding audience psychology, \
and structuring content that both educates and entertains.",
    description: "Develop a content strategy for {topic}:
1. Research the topic: latest trends and developments, key insights and statistics, \
unique angles, and gaps in existing content.
2. Analyse the audience: demographic and psychographic profile, pain points and interests, \
information needs, and level of expertise.
3. Outline the content: hook and unique value proposition, key arguments, supporting data \
points and examples, and the logical flow of information.
4. Identify optimisation opportunities: primary and secondary keywords (consider {keywords}), \
relevant sources and citations, and engagement triggers.

Use the web_search tool to validate trends and gather supporting evidence.",
    expected_output: "A content strategy document with research findings and key insights, \
an audience analysis, a structured content outline, and an SEO and engagement strategy.",
};

const WRITER: StagePrompt = StagePrompt {
    role: "Expert Content Creator",
    goal: "Create an engaging, well-researched, and authoritative article that provides unique \
insights and actionable value on {topic}",
    backstory: "You are a skilled content creator who follows the EEAT principle (Experience, \
Expertise, Authoritativeness, Trustworthiness). Your writing combines deep research with \
storytelling, making complex topics accessible and engaging.",
    description: "Write the article following the content strategy:
1. Open with a strong hook, present unique insights, and support claims with credible data.
2. Use clear headlines and subheadings, keep a logical flow, and include relevant examples.
3. Use active voice, a conversational tone, and the occasional thought-provoking question.
4. Match the specified length of {length} words.
5. Naturally incorporate the keywords: {keywords}.
6. Address these points: {bullet_points}.
7. Finish with practical takeaways and a clear conclusion.

Format the article as Markdown.",
    expected_output: "A polished, engaging Markdown article that educates, entertains, and \
provides genuine value to readers.",
};

const EDITOR: StagePrompt = StagePrompt {
    role: "Senior Content Editor",
    goal: "Refine and polish the content to ensure it meets the highest standards of quality, \
readability, and impact",
    backstory: "You are a meticulous editor with a deep understanding of what makes content \
compelling. You improve clarity, flow, and engagement while keeping the author's voice.",
    description: "Edit the draft article:
1. Structure: verify logical flow, a strong opening and conclusion, and smooth transitions.
2. Content: check factual accuracy, data and statistics, and balance of perspective.
3. Language: vary sentences, remove redundancy, keep the tone consistent.
4. Technical: fix grammar and punctuation, keep formatting and headings consistent, and \
verify the keywords {keywords} are used.
5. Polish: strengthen calls to action and keep the length close to {length} words.

Return only the final article in Markdown.",
    expected_output: "A thoroughly polished, professional article ready for publication.",
};

/// Returns the persona and task text for `stage`.
pub fn prompt_for(stage: Stage) -> &'static StagePrompt {
    match stage {
        Stage::Plan => &PLANNER,
        Stage::Write => &WRITER,
        Stage::Edit => &EDITOR,
    }
}

/// Resolves the known placeholders in `template` from `inputs`.
///
/// Keywords are joined with `", "` and key points with `"; "`. Unknown
/// placeholders are left untouched.
pub fn render(template: &str, inputs: &BlogInputs) -> String {
    template
        .replace("{topic}", &inputs.topic)
        .replace("{keywords}", &inputs.keywords.join(", "))
        .replace("{bullet_points}", &inputs.bullet_points.join("; "))
        .replace("{length}", &inputs.length.to_string())
}

/// Builds the system instruction for `stage`.
pub fn system_instruction(stage: Stage, inputs: &BlogInputs) -> String {
    let prompt = prompt_for(stage);
    format!(
        "You are {role}. {backstory}\nYour personal goal is: {goal}",
        role = prompt.role,
        backstory = render(prompt.backstory, inputs),
        goal = render(prompt.goal, inputs),
    )
}

/// Builds the task message for `stage`, embedding the previous stage's output
/// when there is one.
pub fn task_message(stage: Stage, inputs: &BlogInputs, context: Option<&str>) -> String {
    let prompt = prompt_for(stage);
    let mut message = format!(
        "Current task:\n{description}\n\nExpected output:\n{expected}",
        description = render(prompt.description, inputs),
        expected = render(prompt.expected_output, inputs),
    );
    if let Some(context) = context {
        message.push_str("\n\nContext from the previous step:\n");
        message.push_str(context);
    }
    message
}
