//! services/prompts.rs
//! Textos de prompt para la IA.

use crate::config::app_config::SenderProfile;
use crate::models::template_model::EmailTemplate;

/// Datos de la campaña que se inyectan en el prompt de outreach
#[derive(Debug, Clone, Copy)]
pub struct OutreachTarget<'a> {
    pub company_name: &'a str,
    pub context: &'a str,
    pub target_person: &'a str,
    pub recipient: &'a str,
}

pub fn template_catalog(templates: &[EmailTemplate]) -> String {
    templates
        .iter()
        .enumerate()
        .map(|(i, t)| {
            format!(
                "Template {}:\nName: {}\nDescription: {}\nContent:\n{}",
                i + 1,
                t.name,
                t.description.as_deref().unwrap_or_default(),
                t.template_content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn outreach_prompt(
    target: OutreachTarget<'_>,
    templates: &[EmailTemplate],
    sender: &SenderProfile,
) -> String {
    let recipient_name = if target.target_person.trim().is_empty() {
        "the recipient"
    } else {
        target.target_person
    };
    let sender_company = &sender.company;
    let company_name = target.company_name;
    let catalog = template_catalog(templates);
    let context = target.context;

    format!(
        r#"
You are an expert B2B outreach email writer. You are writing an email FROM {sender_company} TO {company_name} (recipient: {recipient_name}, {recipient}).

Given the following contract/context, select the most appropriate template from the list below and adapt it to generate ONLY the main body of the email. Adapt the technical details and bullet points to match the context.

Templates:
{catalog}

Context/Contract Details:
{context}

Variables:
- recipient_name: {recipient_name}
- contract_type: (extract from context)
- company_name: {company_name}
- sender_company: {sender_company}

Instructions:
- Write as {sender_company} reaching out to {company_name}.
- Select the best template for the context.
- Use HTML <ul><li>...</li></ul> for bullet points, and include only 3 to 5 concise, high-impact bullets.
- Always include a line at the end of the email mentioning the attached capabilities statement.
- Fill in all variables.
- Keep the message concise and professional.
- Do NOT include any signature, closing, sender name, title, company, logo, website, or placeholders for these in your output.
- Do NOT include a subject line in your output.
"#,
        recipient = target.recipient,
    )
}

pub fn subject_prompt(context: &str) -> String {
    format!(
        "Generate a concise, professional subject line for a B2B outreach email based on this context. \
         The subject line should be only 2 or 3 words, no more: {}",
        context
    )
}

pub fn scenario_analysis_prompt(input_text: &str, additional_context: Option<&str>) -> String {
    format!(
        r#"You are an expert in government contracting and business development, skilled at analyzing business opportunities.

Analyze this business opportunity and categorize it:

Input Text:
{input_text}

Additional Context (if any):
{context}

Please analyze and provide:
1. scenario_type (expiring_contract, new_solicitation, partnership_opportunity, or capability_statement)
2. key_information
3. recommended_approach
4. critical_deadlines
5. required_follow_up

Format the response as a single JSON object with these fields and nothing else."#,
        context = additional_context.unwrap_or("None provided"),
    )
}

pub fn response_strategy_prompt(analysis: &serde_json::Value) -> String {
    let analysis = serde_json::to_string_pretty(analysis).unwrap_or_else(|_| analysis.to_string());
    format!(
        r#"You are a senior business development strategist specializing in government contracts.

Create a strategic response plan based on this scenario analysis:

Analysis: {analysis}

Provide a response strategy that includes:
1. key_points
2. value_propositions
3. past_performance_examples
4. call_to_action
5. risk_mitigation

Format the response as a single JSON object with these fields and nothing else."#
    )
}

pub fn learning_prompt(
    scenario_type: &str,
    input_text: &str,
    success_metrics: &serde_json::Value,
) -> String {
    let metrics =
        serde_json::to_string_pretty(success_metrics).unwrap_or_else(|_| success_metrics.to_string());
    format!(
        r#"You are an AI learning specialist focused on improving business development strategies.

Analyze this scenario outcome and provide learning insights:

Scenario Type: {scenario_type}
Original Input: {input_text}
Success Metrics: {metrics}

Provide:
1. successful_elements
2. areas_for_improvement
3. new_patterns (array of short indicator phrases)
4. recommended_adjustments

Format the response as a single JSON object with these fields and nothing else."#
    )
}
