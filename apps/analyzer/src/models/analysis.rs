//! Structured output of the analysis pipeline.
//!
//! A `ResumeAnalysis` is only ever constructed by successfully parsing a
//! model response; a response that cannot be parsed never becomes one.
//! Every optional field carries `#[serde(default)]` so an absent key
//! deserializes to an empty string/list rather than a null.

use serde::{Deserialize, Serialize};

/// One document-scoped analysis result. Holds no identity and no reference
/// back to the source file beyond what the caller retains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub summary: String,
    /// Entries stay in the order the model produced them; no reordering.
    #[serde(default)]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Skills,
    #[serde(default)]
    pub analysis: JobAnalysis,
    #[serde(default)]
    pub metadata: AnalysisMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub graduation_year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default)]
    pub technical: Vec<String>,
    #[serde(default)]
    pub soft: Vec<String>,
    /// Models disagree on the shape here: sometimes a list of strings,
    /// sometimes objects with proficiency levels, sometimes absent.
    #[serde(default = "empty_array")]
    pub languages: serde_json::Value,
    #[serde(default)]
    pub certifications: Vec<String>,
}

impl Default for Skills {
    fn default() -> Self {
        Skills {
            technical: Vec::new(),
            soft: Vec::new(),
            languages: empty_array(),
            certifications: Vec::new(),
        }
    }
}

fn empty_array() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobAnalysis {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Expected range 0–100, but never clamped: an out-of-range value is a
    /// data-quality signal for callers, not an error.
    #[serde(default)]
    pub match_score: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    #[serde(default)]
    pub analysis_date: String,
    #[serde(default)]
    pub word_count: i32,
    #[serde(default)]
    pub estimated_yoe: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip_preserves_every_field() {
        let analysis = ResumeAnalysis {
            personal_info: PersonalInfo {
                name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                phone: "+1 555 0100".to_string(),
                location: "Berlin".to_string(),
                links: vec!["https://github.com/janedoe".to_string()],
            },
            summary: "Backend engineer with five years of Go experience.".to_string(),
            work_experience: vec![WorkExperience {
                company: "Acme".to_string(),
                position: "Engineer".to_string(),
                duration: "2019-2024".to_string(),
                responsibilities: vec!["Built services".to_string()],
                achievements: vec!["Cut latency 40%".to_string()],
            }],
            education: vec![Education {
                institution: "TU Berlin".to_string(),
                degree: "BSc".to_string(),
                field: "CS".to_string(),
                graduation_year: "2019".to_string(),
            }],
            skills: Skills {
                technical: vec!["Go".to_string(), "Rust".to_string()],
                soft: vec!["Communication".to_string()],
                languages: serde_json::json!(["English", "German"]),
                certifications: vec![],
            },
            analysis: JobAnalysis {
                strengths: vec!["Strong backend background".to_string()],
                weaknesses: vec![],
                recommendations: vec!["Ask about Rust depth".to_string()],
                match_score: 82,
            },
            metadata: AnalysisMetadata {
                analysis_date: "2025-01-15".to_string(),
                word_count: 312,
                estimated_yoe: 5,
            },
        };

        let json = serde_json::to_string(&analysis).unwrap();
        let recovered: ResumeAnalysis = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, analysis);
    }

    #[test]
    fn test_absent_optional_fields_become_empty_not_null() {
        // The bare minimum the model could legally return.
        let recovered: ResumeAnalysis = serde_json::from_str("{}").unwrap();

        assert_eq!(recovered.personal_info.links, Vec::<String>::new());
        assert_eq!(recovered.work_experience, vec![]);
        assert_eq!(recovered.education, vec![]);
        assert_eq!(recovered.skills.technical, Vec::<String>::new());
        assert_eq!(recovered.skills.languages, serde_json::json!([]));
        assert_eq!(recovered.analysis.strengths, Vec::<String>::new());
        assert_eq!(recovered.summary, "");
        assert_eq!(recovered.analysis.match_score, 0);
    }

    #[test]
    fn test_absent_arrays_normalize_identically_after_round_trip() {
        let sparse: ResumeAnalysis = serde_json::from_str(
            r#"{"personal_info": {"name": "Jane Doe"}, "summary": "Engineer"}"#,
        )
        .unwrap();

        let json = serde_json::to_string(&sparse).unwrap();
        let recovered: ResumeAnalysis = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, sparse);
        // Serialized form must not contain nulls for the absent arrays.
        assert!(!json.contains("null"), "unexpected null in {json}");
    }

    #[test]
    fn test_languages_accepts_flexible_shapes() {
        let as_objects: Skills = serde_json::from_str(
            r#"{"technical": [], "languages": [{"name": "English", "level": "C2"}]}"#,
        )
        .unwrap();
        assert!(as_objects.languages.is_array());

        let as_string: Skills = serde_json::from_str(r#"{"languages": "English, German"}"#).unwrap();
        assert_eq!(as_string.languages, serde_json::json!("English, German"));
    }

    #[test]
    fn test_match_score_is_not_clamped() {
        let odd: JobAnalysis = serde_json::from_str(r#"{"match_score": 140}"#).unwrap();
        assert_eq!(odd.match_score, 140);
        let negative: JobAnalysis = serde_json::from_str(r#"{"match_score": -5}"#).unwrap();
        assert_eq!(negative.match_score, -5);
    }
}
