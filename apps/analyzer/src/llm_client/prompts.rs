// Prompt constants for the resume-analysis completion call. The schema
// example in the user prompt is load-bearing: the parser expects exactly
// these keys back, and models follow a literal example far more reliably
// than a prose description of the shape.

/// System instruction constraining the model to JSON-only output.
pub const ANALYSIS_SYSTEM: &str = "You are a professional resume analyst. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"[Job Opening]
Job title: {job_title}
Job requirements: {job_requirements}
Job description: {job_description}

Analyze the following resume against the job opening:

{resume_text}

Return strictly the following JSON structure:
{
  "personal_info": { "name": "", "email": "", "phone": "", "location": "", "links": [] },
  "summary": "",
  "work_experience": [],
  "education": [],
  "skills": { "technical": [], "soft": [], "languages": [], "certifications": [] },
  "analysis": { "strengths": [], "weaknesses": [], "recommendations": [], "match_score": 0 },
  "metadata": { "analysis_date": "", "word_count": 0, "estimated_yoe": 0 }
}"#;

/// Builds the user prompt by filling the template.
pub fn build_analysis_prompt(
    job_title: &str,
    job_requirements: &str,
    job_description: &str,
    resume_text: &str,
) -> String {
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{job_title}", job_title)
        .replace("{job_requirements}", job_requirements)
        .replace("{job_description}", job_description)
        .replace("{resume_text}", resume_text)
}
