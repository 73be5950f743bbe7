//! Portfolio content: profile, skills, projects, publications.
//!
//! Placeholder data only. [`render_sections`] turns it into HTML fragments
//! that the template source places at `{{ portfolio }}`.

use std::fmt::Write;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Skill {
    pub name: &'static str,
    /// Self-assessed proficiency, 0–100.
    pub proficiency: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillCategory {
    pub name: &'static str,
    pub items: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub title: &'static str,
    pub description: &'static str,
    pub technologies: Vec<&'static str>,
    pub image: &'static str,
    pub repository: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Publication {
    pub title: &'static str,
    pub venue: &'static str,
    pub year: u16,
    pub link: &'static str,
    pub authors: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Portfolio {
    pub name: &'static str,
    pub title: &'static str,
    pub tagline: &'static str,
    pub about: Vec<&'static str>,
    pub skills: Vec<Skill>,
    pub skill_categories: Vec<SkillCategory>,
    pub projects: Vec<Project>,
    pub publications: Vec<Publication>,
}

impl Portfolio {
    pub fn sample() -> Self {
        Self {
            name: "John Doe",
            title: "Machine Learning Engineer",
            tagline: "Building intelligent systems that solve real-world problems",
            about: vec![
                "Machine Learning Engineer with 5+ years of experience developing and deploying ML \
                 solutions across healthcare, finance, and retail.",
                "Focused on deep learning, computer vision, and natural language processing, with an \
                 eye on scalable, production-ready systems.",
            ],
            skills: [
                ("Python", 95),
                ("TensorFlow", 90),
                ("PyTorch", 85),
                ("Scikit-Learn", 92),
                ("Deep Learning", 88),
                ("NLP", 80),
                ("Computer Vision", 85),
                ("MLOps", 75),
                ("Data Visualization", 90),
                ("SQL", 85),
            ]
            .into_iter()
            .map(|(name, proficiency)| Skill { name, proficiency })
            .collect(),
            skill_categories: vec![
                SkillCategory {
                    name: "Machine Learning",
                    items: vec![
                        "Supervised Learning: Classification, Regression",
                        "Unsupervised Learning: Clustering, Dimensionality Reduction",
                        "Reinforcement Learning: Q-Learning, Policy Gradients",
                        "Ensemble Methods: Random Forests, Gradient Boosting",
                    ],
                },
                SkillCategory {
                    name: "Deep Learning",
                    items: vec![
                        "Architectures: CNN, RNN, LSTM, GAN",
                        "Frameworks: TensorFlow, PyTorch, Keras",
                        "Transfer Learning & Fine-tuning",
                        "Model Optimization & Quantization",
                    ],
                },
                SkillCategory {
                    name: "MLOps & Engineering",
                    items: vec![
                        "CI/CD for ML: GitHub Actions, Jenkins",
                        "Containerization: Docker, Kubernetes",
                        "Model Serving: TensorFlow Serving, TorchServe",
                        "Monitoring: Prometheus, Grafana",
                    ],
                },
                SkillCategory {
                    name: "Data Engineering",
                    items: vec![
                        "ETL Pipelines: Airflow, Spark",
                        "Databases: SQL, MongoDB, Redis",
                        "Data Visualization: Matplotlib, Plotly, Tableau",
                    ],
                },
            ],
            projects: vec![
                Project {
                    title: "Computer Vision for Medical Imaging",
                    description: "Deep learning model that flags anomalies in medical scans.",
                    technologies: vec!["PyTorch", "CNN", "Transfer Learning", "DICOM"],
                    image: "static/images/medical_imaging.jpg",
                    repository: "https://github.com/username/medical-imaging",
                },
                Project {
                    title: "NLP for Customer Sentiment Analysis",
                    description: "End-to-end pipeline analysing customer feedback with BERT-based models.",
                    technologies: vec!["Transformers", "HuggingFace", "BERT"],
                    image: "static/images/nlp_sentiment.jpg",
                    repository: "https://github.com/username/sentiment-analysis",
                },
                Project {
                    title: "Time Series Forecasting for Energy Consumption",
                    description: "LSTM and Prophet models predicting energy usage for smart grids.",
                    technologies: vec!["TensorFlow", "LSTM", "Prophet"],
                    image: "static/images/time_series.jpg",
                    repository: "https://github.com/username/energy-forecasting",
                },
                Project {
                    title: "MLOps Pipeline for Model Deployment",
                    description: "CI/CD for ML models with automated testing, versioning, and monitoring.",
                    technologies: vec!["Docker", "Kubernetes", "GitHub Actions", "MLflow"],
                    image: "static/images/mlops.jpg",
                    repository: "https://github.com/username/mlops-pipeline",
                },
            ],
            publications: vec![
                Publication {
                    title: "Advances in Transfer Learning for Low-Resource Medical Imaging",
                    venue: "Journal of Machine Learning Research",
                    year: 2023,
                    link: "https://example.com/paper1",
                    authors: "Your Name, Collaborator One, Collaborator Two",
                },
                Publication {
                    title: "Efficient Transformer Architectures for Edge Deployment",
                    venue: "Conference on Neural Information Processing Systems (NeurIPS)",
                    year: 2022,
                    link: "https://example.com/paper2",
                    authors: "Your Name, Collaborator Three",
                },
                Publication {
                    title: "Explainable AI Methods for Healthcare Applications",
                    venue: "IEEE Transactions on Medical Imaging",
                    year: 2021,
                    link: "https://example.com/paper3",
                    authors: "Collaborator Four, Your Name, Collaborator Five",
                },
            ],
        }
    }
}

/// Minimal HTML text/attribute escaping.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Hero, about, skills, projects, publications and contact sections.
///
/// The skills "chart" is a list of proportional bars; charting proper is
/// left to whatever front end consumes `/api/portfolio`.
pub fn render_sections(p: &Portfolio) -> String {
    let e = escape_html;
    let mut html = String::new();

    // `write!` into a String cannot fail.
    let _ = write!(
        html,
        "<section id=\"hero\"><h1>{}</h1><h2>{}</h2><p>{}</p></section>\n",
        e(p.name),
        e(p.title),
        e(p.tagline)
    );

    html.push_str("<section id=\"about\"><h2>About Me</h2>");
    for para in &p.about {
        let _ = write!(html, "<p>{}</p>", e(para));
    }
    html.push_str("</section>\n");

    html.push_str("<section id=\"skills\"><h2>Skills</h2><ul class=\"skill-bars\">");
    for s in &p.skills {
        let _ = write!(
            html,
            "<li><span>{}</span><div class=\"bar\" style=\"width: {}%\"></div></li>",
            e(s.name),
            s.proficiency.min(100)
        );
    }
    html.push_str("</ul>");
    for cat in &p.skill_categories {
        let _ = write!(html, "<details><summary>{}</summary><ul>", e(cat.name));
        for item in &cat.items {
            let _ = write!(html, "<li>{}</li>", e(item));
        }
        html.push_str("</ul></details>");
    }
    html.push_str("</section>\n");

    html.push_str("<section id=\"projects\"><h2>Projects</h2>");
    for proj in &p.projects {
        let _ = write!(
            html,
            "<article><img src=\"{}\" alt=\"\"><h3>{}</h3><p>{}</p><p>",
            e(proj.image),
            e(proj.title),
            e(proj.description)
        );
        for tech in &proj.technologies {
            let _ = write!(html, "<span class=\"badge\">{}</span>", e(tech));
        }
        let _ = write!(html, "</p><a href=\"{}\">GitHub</a></article>", e(proj.repository));
    }
    html.push_str("</section>\n");

    html.push_str("<section id=\"publications\"><h2>Publications</h2>");
    for publ in &p.publications {
        let _ = write!(
            html,
            "<article><h3>{}</h3><p>{}</p><p>{} ({})</p><a href=\"{}\">Read Paper</a></article>",
            e(publ.title),
            e(publ.authors),
            e(publ.venue),
            publ.year,
            e(publ.link)
        );
    }
    html.push_str("</section>\n");

    html.push_str(
        "<section id=\"contact\"><h2>Contact Me</h2>\
         <form data-endpoint=\"/api/contact\">\
         <input name=\"name\" placeholder=\"Name\">\
         <input name=\"email\" type=\"email\" placeholder=\"Email\">\
         <input name=\"subject\" placeholder=\"Subject\">\
         <textarea name=\"message\" placeholder=\"Message\"></textarea>\
         <button type=\"submit\">Send Message</button>\
         </form></section>\n",
    );

    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_has_every_section() {
        let p = Portfolio::sample();
        assert!(!p.skills.is_empty());
        assert!(!p.skill_categories.is_empty());
        assert_eq!(p.projects.len(), 4);
        assert_eq!(p.publications.len(), 3);
        assert!(p.skills.iter().all(|s| s.proficiency <= 100));
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn sections_render_anchors_and_content() {
        let html = render_sections(&Portfolio::sample());
        for id in ["hero", "about", "skills", "projects", "publications", "contact"] {
            assert!(html.contains(&format!("id=\"{id}\"")), "missing section {id}");
        }
        assert!(html.contains("Computer Vision for Medical Imaging"));
        assert!(html.contains("width: 95%"));
        assert!(html.contains("(2023)"));
    }

    #[test]
    fn serializes_for_api() {
        let v = serde_json::to_value(Portfolio::sample()).unwrap();
        assert_eq!(v["name"], "John Doe");
        assert_eq!(v["skills"][0]["proficiency"], 95);
        assert_eq!(v["publications"][1]["year"], 2022);
    }
}
