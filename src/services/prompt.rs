use crate::models::{HistoryEntry, MaterialRecommendation};

const CONTEXT_WINDOW: usize = 4;

const INSTRUCTIONS: &str = "Instruksi:\n\
- Jawab pertanyaan pengguna dengan jelas, akurat, dan membantu.\n\
- Jika ada materi yang relevan di atas, rujuk materi tersebut dalam jawabanmu.\n\
- Gunakan format yang rapi: judul, poin-poin, atau contoh kode bila diperlukan.\n\
- Gunakan nada yang ramah dan bersahabat, seperti teman belajar.";

fn role_label(role: &str) -> &str {
    match role {
        "user" => "User",
        "assistant" => "Assistant",
        other => other,
    }
}

pub fn build_prompt(
    message: &str,
    materials: &[MaterialRecommendation],
    history: &[HistoryEntry],
) -> String {
    let mut prompt = String::new();

    let recent = &history[history.len().saturating_sub(CONTEXT_WINDOW)..];
    if !recent.is_empty() {
        prompt.push_str("Conversation Context:\n");
        for entry in recent {
            prompt.push_str(&format!("{}: {}\n", role_label(&entry.role), entry.content));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!("User Question: {}\n\n", message));

    if !materials.is_empty() {
        prompt.push_str("Relevant Materials:\n");
        for (i, m) in materials.iter().enumerate() {
            prompt.push_str(&format!(
                "{}. {}\n   URL: {}\n   Description: {}\n",
                i + 1,
                m.title,
                m.url,
                m.description
            ));
        }
        prompt.push('\n');
    }

    prompt.push_str(INSTRUCTIONS);
    prompt
}
