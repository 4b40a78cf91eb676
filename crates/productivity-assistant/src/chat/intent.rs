//! Keyword intent classifier for the offline engine.
//!
//! Rules are evaluated top to bottom and the first match wins. `words` must
//! match a whole token; `fragments` may appear anywhere in the lower-cased
//! message.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    DocumentAnalysis,
    Greeting,
    Capabilities,
    Study,
    Finance,
    Motivation,
    Habits,
    MentalWellness,
    TimeManagement,
    Goals,
    Identity,
    Fallback,
}

struct IntentRule {
    intent: Intent,
    words: &'static [&'static str],
    fragments: &'static [&'static str],
}

const RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::Greeting,
        words: &["halo", "hallo", "hai", "hi", "hello", "hey", "hei"],
        fragments: &[
            "selamat pagi", "selamat siang", "selamat sore", "selamat malam", "assalamualaikum",
        ],
    },
    IntentRule {
        intent: Intent::Capabilities,
        words: &["help", "menu"],
        fragments: &[
            "bisa apa", "apa yang bisa", "fitur", "bantuan", "kemampuan", "cara pakai",
            "bisa bantu apa",
        ],
    },
    IntentRule {
        intent: Intent::Study,
        words: &["study"],
        fragments: &[
            "belajar", "fokus", "pomodoro", "konsentrasi", "ujian", "kuliah", "sekolah", "materi",
        ],
    },
    IntentRule {
        intent: Intent::Finance,
        words: &["uang", "duit"],
        fragments: &[
            "keuangan", "menabung", "nabung", "tabungan", "hemat", "budget", "anggaran", "saldo",
            "pengeluaran", "pemasukan", "finansial", "gaji", "investasi",
        ],
    },
    IntentRule {
        intent: Intent::Motivation,
        words: &["mood"],
        fragments: &[
            "motivasi", "semangat", "malas", "sedih", "capek", "lelah", "bosan", "menyerah",
            "galau",
        ],
    },
    IntentRule {
        intent: Intent::Habits,
        words: &[],
        fragments: &["kebiasaan", "habit", "rutinitas", "streak", "konsisten", "disiplin"],
    },
    IntentRule {
        intent: Intent::MentalWellness,
        words: &[],
        fragments: &[
            "stres", "stress", "cemas", "anxiety", "overthinking", "mental", "burnout", "tidur",
            "insomnia", "khawatir", "tenang",
        ],
    },
    IntentRule {
        intent: Intent::TimeManagement,
        words: &[],
        fragments: &[
            "waktu", "jadwal", "prioritas", "deadline", "produktif", "menunda", "prokrastinasi",
            "tugas",
        ],
    },
    IntentRule {
        intent: Intent::Goals,
        words: &["goal", "goals"],
        fragments: &["tujuan", "target", "resolusi", "impian", "cita-cita", "rencana"],
    },
    IntentRule {
        intent: Intent::Identity,
        words: &[],
        fragments: &["siapa kamu", "kamu siapa", "namamu", "nama kamu", "who are you", "kamu itu apa"],
    },
];

/// Classify a message. A document turn is always `DocumentAnalysis`,
/// regardless of its text.
pub fn classify(message: &str, has_document: bool) -> Intent {
    if has_document {
        return Intent::DocumentAnalysis;
    }

    let lower = message.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    RULES
        .iter()
        .find(|rule| {
            rule.words.iter().any(|w| tokens.contains(w))
                || rule.fragments.iter().any(|f| lower.contains(f))
        })
        .map(|rule| rule.intent)
        .unwrap_or(Intent::Fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_representative_messages() {
        let cases = [
            ("halo", Intent::Greeting),
            ("Hai kak!", Intent::Greeting),
            ("Selamat pagi", Intent::Greeting),
            ("kamu bisa apa aja?", Intent::Capabilities),
            ("gimana cara fokus belajar?", Intent::Study),
            ("tips menabung", Intent::Finance),
            ("uang jajanku habis", Intent::Finance),
            ("aku lagi malas banget", Intent::Motivation),
            ("cara membangun kebiasaan baik", Intent::Habits),
            ("aku stres mikirin skripsi", Intent::MentalWellness),
            ("banyak deadline minggu ini", Intent::TimeManagement),
            ("bantu susun target tahun ini", Intent::Goals),
            ("siapa kamu sebenarnya", Intent::Identity),
            ("cuaca hari ini", Intent::Fallback),
        ];
        for (message, expected) in cases {
            assert_eq!(classify(message, false), expected, "message: {}", message);
        }
    }

    #[test]
    fn test_document_flag_wins_over_text() {
        assert_eq!(classify("halo", true), Intent::DocumentAnalysis);
        assert_eq!(classify("", true), Intent::DocumentAnalysis);
    }

    #[test]
    fn test_first_match_wins() {
        // Greeting is checked before identity.
        assert_eq!(classify("hai, siapa kamu?", false), Intent::Greeting);
        // Study is checked before motivation.
        assert_eq!(classify("malas belajar", false), Intent::Study);
    }

    #[test]
    fn test_short_words_need_token_boundaries() {
        assert_eq!(classify("hitung ulang", false), Intent::Fallback);
        assert_eq!(classify("ruang tamu", false), Intent::Fallback);
        assert_eq!(classify("Hi there", false), Intent::Greeting);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("TIPS MENABUNG", false), Intent::Finance);
        assert_eq!(classify("POMODORO", false), Intent::Study);
    }
}
