//! Question catalog keyed by topic id
//!
//! `QuestionSource` is the seam the quiz session draws from. The in-memory
//! `QuestionCatalog` ships with a small sample set and can be loaded from a
//! JSON fixture of the shape `{ "topics": [...], "questions": [...] }`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{QuizError, Result};
use super::models::{Difficulty, Question, Topic};

/// Supplies topics and their question pools
pub trait QuestionSource {
    fn topics(&self) -> Vec<Topic>;

    /// Questions for a topic in catalog order. Unknown topics yield an empty pool.
    fn questions_for(&self, topic_id: &str) -> Vec<Question>;

    fn has_topic(&self, topic_id: &str) -> bool {
        self.topics().iter().any(|t| t.id == topic_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionCatalog {
    pub topics: Vec<Topic>,
    pub questions: Vec<Question>,
}

impl QuestionCatalog {
    /// Build a catalog, validating every question
    pub fn new(topics: Vec<Topic>, questions: Vec<Question>) -> Result<Self> {
        for q in &questions {
            q.validate().map_err(QuizError::InvalidQuestion)?;
            if !topics.iter().any(|t| t.id == q.topic_id) {
                log::warn!("Question {} references unknown topic {}", q.id, q.topic_id);
            }
        }
        Ok(Self { topics, questions })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: QuestionCatalog = serde_json::from_str(json)?;
        Self::new(raw.topics, raw.questions)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&content)?;
        log::info!(
            "Loaded catalog from {}: {} topics, {} questions",
            path.display(),
            catalog.topics.len(),
            catalog.questions.len()
        );
        Ok(catalog)
    }

    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == topic_id)
    }

    pub fn question_count(&self, topic_id: &str) -> usize {
        self.questions.iter().filter(|q| q.topic_id == topic_id).count()
    }

    /// Built-in sample catalog
    pub fn sample() -> Self {
        let topics = vec![
            topic("heart-failure", "Heart Failure", "Cardiology"),
            topic("acute-coronary-syndrome", "Acute Coronary Syndrome", "Cardiology"),
            topic("diabetes-mellitus", "Diabetes Mellitus", "Endocrinology"),
            topic("community-acquired-pneumonia", "Community-Acquired Pneumonia", "Pulmonology"),
        ];

        let questions = vec![
            question(
                "hf-1",
                "heart-failure",
                "Which drug class has shown a mortality benefit in heart failure with reduced ejection fraction?",
                &["Loop diuretics", "Beta-blockers", "Digoxin", "Calcium channel blockers"],
                1,
                "Carvedilol, metoprolol succinate and bisoprolol reduce mortality in HFrEF.",
                Difficulty::Easy,
                &["pharmacology", "hfref"],
            )
            .with_option_explanations(&[
                "Loop diuretics relieve congestion but do not reduce mortality.",
                "Evidence-based beta-blockers reduce mortality and hospitalization.",
                "Digoxin reduces hospitalization without a mortality benefit.",
                "Non-dihydropyridine CCBs can worsen HFrEF.",
            ]),
            question(
                "hf-2",
                "heart-failure",
                "An ejection fraction of 35% with symptoms of congestion is classified as:",
                &["HFpEF", "HFmrEF", "HFrEF", "HFimpEF"],
                2,
                "HFrEF is defined by an LVEF of 40% or less.",
                Difficulty::Easy,
                &["classification"],
            ),
            question(
                "hf-3",
                "heart-failure",
                "Which lab value is most useful to exclude heart failure in a patient with acute dyspnea?",
                &["Troponin", "D-dimer", "BNP", "Procalcitonin"],
                2,
                "A normal BNP or NT-proBNP has a high negative predictive value for heart failure.",
                Difficulty::Medium,
                &["diagnosis", "biomarkers"],
            ),
            question(
                "acs-1",
                "acute-coronary-syndrome",
                "ST elevation in leads II, III and aVF suggests occlusion of which artery?",
                &["Left anterior descending", "Left circumflex", "Right coronary artery", "Left main"],
                2,
                "Inferior STEMI is most often caused by right coronary artery occlusion.",
                Difficulty::Medium,
                &["ecg", "stemi"],
            )
            .with_category("ECG"),
            question(
                "acs-2",
                "acute-coronary-syndrome",
                "What is the target door-to-balloon time for primary PCI in STEMI?",
                &["30 minutes", "90 minutes", "3 hours", "12 hours"],
                1,
                "Guidelines target a door-to-balloon time of 90 minutes or less.",
                Difficulty::Easy,
                &["stemi", "management"],
            ),
            question(
                "acs-3",
                "acute-coronary-syndrome",
                "Which finding distinguishes NSTEMI from unstable angina?",
                &["ST depression", "Elevated troponin", "Chest pain at rest", "T wave inversion"],
                1,
                "NSTEMI shows myocardial necrosis with a troponin rise; unstable angina does not.",
                Difficulty::Medium,
                &["diagnosis", "biomarkers"],
            ),
            question(
                "acs-4",
                "acute-coronary-syndrome",
                "A patient develops a new holosystolic murmur 4 days after an inferior MI. The most likely cause is:",
                &["Pericarditis", "Papillary muscle rupture", "Aortic dissection", "Ventricular aneurysm"],
                1,
                "Posteromedial papillary muscle rupture causes acute mitral regurgitation after inferior MI.",
                Difficulty::Hard,
                &["complications"],
            ),
            question(
                "dm-1",
                "diabetes-mellitus",
                "Which HbA1c value is diagnostic of diabetes mellitus?",
                &["5.4%", "5.9%", "6.2%", "6.5%"],
                3,
                "An HbA1c of 6.5% or higher is diagnostic.",
                Difficulty::Easy,
                &["diagnosis"],
            ),
            question(
                "dm-2",
                "diabetes-mellitus",
                "First-line pharmacotherapy for most adults with type 2 diabetes is:",
                &["Insulin glargine", "Metformin", "Glipizide", "Pioglitazone"],
                1,
                "Metformin is first-line unless contraindicated.",
                Difficulty::Easy,
                &["pharmacology"],
            ),
            question(
                "dm-3",
                "diabetes-mellitus",
                "In diabetic ketoacidosis, insulin infusion should be delayed when serum potassium is:",
                &["Below 3.3 mEq/L", "Between 3.5 and 5.0 mEq/L", "Above 5.2 mEq/L", "Never"],
                0,
                "Insulin drives potassium intracellularly; replete potassium first when it is below 3.3.",
                Difficulty::Hard,
                &["dka", "emergency"],
            ),
            question(
                "dm-4",
                "diabetes-mellitus",
                "Which drug class offers cardiovascular and renal protection in type 2 diabetes?",
                &["Sulfonylureas", "DPP-4 inhibitors", "SGLT2 inhibitors", "Meglitinides"],
                2,
                "SGLT2 inhibitors reduce heart failure hospitalization and CKD progression.",
                Difficulty::Medium,
                &["pharmacology"],
            ),
            question(
                "cap-1",
                "community-acquired-pneumonia",
                "The most common bacterial cause of community-acquired pneumonia is:",
                &["Staphylococcus aureus", "Streptococcus pneumoniae", "Klebsiella pneumoniae", "Legionella"],
                1,
                "Streptococcus pneumoniae remains the most common bacterial pathogen.",
                Difficulty::Easy,
                &["microbiology"],
            ),
            question(
                "cap-2",
                "community-acquired-pneumonia",
                "A CURB-65 score of 3 suggests:",
                &["Outpatient treatment", "Short observation", "Hospital admission, consider ICU", "No treatment"],
                2,
                "A score of 3 or more indicates severe pneumonia warranting admission.",
                Difficulty::Medium,
                &["severity"],
            ),
            question(
                "cap-3",
                "community-acquired-pneumonia",
                "Empiric outpatient therapy for a healthy adult without comorbidities is:",
                &["Amoxicillin", "Vancomycin", "Meropenem", "Ciprofloxacin"],
                0,
                "High-dose amoxicillin is recommended for healthy outpatients.",
                Difficulty::Medium,
                &["management"],
            ),
        ];

        Self { topics, questions }
    }
}

impl QuestionSource for QuestionCatalog {
    fn topics(&self) -> Vec<Topic> {
        self.topics.clone()
    }

    fn questions_for(&self, topic_id: &str) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| q.topic_id == topic_id)
            .cloned()
            .collect()
    }

    fn has_topic(&self, topic_id: &str) -> bool {
        self.topic(topic_id).is_some()
    }
}

fn topic(id: &str, name: &str, category: &str) -> Topic {
    Topic {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        description: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn question(
    id: &str,
    topic_id: &str,
    prompt: &str,
    options: &[&str],
    correct_answer: usize,
    explanation: &str,
    difficulty: Difficulty,
    tags: &[&str],
) -> Question {
    Question {
        id: id.to_string(),
        topic_id: topic_id.to_string(),
        question: prompt.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer,
        explanation: explanation.to_string(),
        option_explanations: None,
        difficulty,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        category: None,
    }
}

impl Question {
    fn with_option_explanations(mut self, explanations: &[&str]) -> Self {
        self.option_explanations = Some(explanations.iter().map(|e| e.to_string()).collect());
        self
    }

    fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sample_catalog_is_valid() {
        let sample = QuestionCatalog::sample();
        let rebuilt = QuestionCatalog::new(sample.topics.clone(), sample.questions.clone());
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn test_heart_failure_has_three_questions() {
        let catalog = QuestionCatalog::sample();
        assert_eq!(catalog.questions_for("heart-failure").len(), 3);
        assert_eq!(catalog.question_count("heart-failure"), 3);
    }

    #[test]
    fn test_unknown_topic_yields_empty_pool() {
        let catalog = QuestionCatalog::sample();
        assert!(catalog.questions_for("nephrology").is_empty());
        assert!(!catalog.has_topic("nephrology"));
        assert!(catalog.has_topic("heart-failure"));
    }

    #[test]
    fn test_from_json_rejects_invalid_question() {
        let json = r#"{
            "topics": [{"id": "t", "name": "T", "category": "C"}],
            "questions": [{
                "id": "q", "topicId": "t", "question": "?",
                "options": ["a", "b"], "correctAnswer": 5,
                "explanation": "", "difficulty": "easy"
            }]
        }"#;
        let result = QuestionCatalog::from_json_str(json);
        assert!(matches!(result, Err(QuizError::InvalidQuestion(_))));
    }

    #[test]
    fn test_load_from_file() {
        let catalog = QuestionCatalog::sample();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&catalog).unwrap().as_bytes())
            .unwrap();

        let loaded = QuestionCatalog::load(file.path()).unwrap();
        assert_eq!(loaded.topics.len(), catalog.topics.len());
        assert_eq!(loaded.questions, catalog.questions);
    }
}
