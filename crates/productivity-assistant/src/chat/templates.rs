//! Response templates for the offline engine.
//!
//! Templates are plain functions of the context so each one is testable. All
//! templates in a category share a recognizable marker (the user's name for
//! greetings, "50/30/20" for finance, and so on).

use crate::processing::DocumentSummary;
use crate::types::{DocumentAnalysis, UserContext};

use super::intent::Intent;

pub type Template = fn(&UserContext) -> String;
pub type DocumentTemplate = fn(&UserContext, &DocumentAnalysis, &DocumentSummary) -> String;

/// Templates for a text intent. Empty for `DocumentAnalysis`, which uses
/// [`DOCUMENT`].
pub fn for_intent(intent: Intent) -> &'static [Template] {
    match intent {
        Intent::Greeting => GREETING,
        Intent::Capabilities => CAPABILITIES,
        Intent::Study => STUDY,
        Intent::Finance => FINANCE,
        Intent::Motivation => MOTIVATION,
        Intent::Habits => HABITS,
        Intent::MentalWellness => MENTAL_WELLNESS,
        Intent::TimeManagement => TIME_MANAGEMENT,
        Intent::Goals => GOALS,
        Intent::Identity => IDENTITY,
        Intent::Fallback => FALLBACK,
        Intent::DocumentAnalysis => &[],
    }
}

// ── Greeting ───────────────────────────────────────────────────────────────

const GREETING: &[Template] = &[greeting_streak, greeting_tasks, greeting_plain];

fn greeting_streak(ctx: &UserContext) -> String {
    format!(
        "Halo {}! 👋 Senang bertemu lagi. Streak aktivitasmu sekarang {} hari. Ada yang bisa aku bantu hari ini?",
        ctx.user_name, ctx.streak
    )
}

fn greeting_tasks(ctx: &UserContext) -> String {
    format!(
        "Hai {}! 😊 Kamu punya {} tugas yang belum selesai hari ini. Mau mulai dari mana?",
        ctx.user_name, ctx.today_tasks
    )
}

fn greeting_plain(ctx: &UserContext) -> String {
    format!(
        "Halo juga, {}! ✨ Aku siap membantu soal belajar, keuangan, kebiasaan, atau sekadar ngobrol.",
        ctx.user_name
    )
}

// ── Capabilities ───────────────────────────────────────────────────────────

const CAPABILITIES: &[Template] = &[capabilities_list, capabilities_short, capabilities_data];

fn capabilities_list(_ctx: &UserContext) -> String {
    "Ini hal-hal yang bisa aku bantu:\n\
     📚 Tips belajar dan fokus\n\
     💰 Mengatur keuangan dan menabung\n\
     🔥 Membangun kebiasaan dan menjaga streak\n\
     🧠 Kesehatan mental dan mengelola stres\n\
     ⏰ Manajemen waktu dan prioritas\n\
     🎯 Menyusun tujuan\n\
     📄 Meringkas dokumen PDF yang kamu unggah"
        .to_string()
}

fn capabilities_short(ctx: &UserContext) -> String {
    format!(
        "Aku bisa bantu kamu belajar, atur uang, bangun kebiasaan, jaga kesehatan mental, atur waktu, dan meringkas PDF, {}. Coba tanya \"tips menabung\" atau \"cara fokus belajar\"!",
        ctx.user_name
    )
}

fn capabilities_data(ctx: &UserContext) -> String {
    format!(
        "Aku bisa membaca ringkasan aktivitasmu: {} sesi belajar, {} tugas selesai, {} jurnal, dan saldo {}. Dari situ aku kasih saran yang pas buat kamu. Unggah PDF juga bisa untuk diringkas!",
        ctx.study_sessions, ctx.tasks_completed, ctx.journal_entries, ctx.balance
    )
}

// ── Study ──────────────────────────────────────────────────────────────────

const STUDY: &[Template] = &[study_pomodoro, study_progress, study_environment];

fn study_pomodoro(ctx: &UserContext) -> String {
    format!(
        "📚 Coba teknik Pomodoro: fokus 25 menit, istirahat 5 menit, dan setelah 4 putaran ambil istirahat panjang 15-30 menit. Kamu sudah mencatat {} sesi belajar, pertahankan!",
        ctx.study_sessions
    )
}

fn study_progress(ctx: &UserContext) -> String {
    format!(
        "Sejauh ini ada {} sesi belajar tercatat, {}. Tips: mulai dari materi tersulit saat energi masih penuh, lalu gunakan Pomodoro supaya fokus tetap terjaga.",
        ctx.study_sessions, ctx.user_name
    )
}

fn study_environment(_ctx: &UserContext) -> String {
    "🎯 Biar fokus: jauhkan HP, siapkan satu tujuan kecil per sesi, dan pakai timer Pomodoro. Setelah belajar, coba jelaskan ulang materinya dengan kata-katamu sendiri."
        .to_string()
}

// ── Finance ────────────────────────────────────────────────────────────────

const FINANCE: &[Template] = &[finance_rule, finance_balance, finance_tracking];

fn finance_rule(ctx: &UserContext) -> String {
    format!(
        "💰 Coba aturan 50/30/20: 50% untuk kebutuhan, 30% untuk keinginan, dan 20% untuk tabungan. Saldo kamu saat ini {}.",
        ctx.balance
    )
}

fn finance_balance(ctx: &UserContext) -> String {
    let note = if ctx.balance.amount() < 0.0 {
        "Pengeluaranmu lebih besar dari pemasukan, yuk cek lagi pos yang bisa dikurangi."
    } else {
        "Bagus, keuanganmu masih positif!"
    };
    format!(
        "Saldo kamu {}. {} Sisihkan tabungan di awal bulan dengan pola 50/30/20 supaya tidak tergoda belanja.",
        ctx.balance, note
    )
}

fn finance_tracking(ctx: &UserContext) -> String {
    format!(
        "Tips menabung, {}: catat setiap pengeluaran, bedakan kebutuhan dan keinginan, lalu pakai pembagian 50/30/20. Saldo tercatat saat ini {}.",
        ctx.user_name, ctx.balance
    )
}

// ── Motivation ─────────────────────────────────────────────────────────────

const MOTIVATION: &[Template] = &[motivation_small_steps, motivation_progress, motivation_rest];

fn motivation_small_steps(ctx: &UserContext) -> String {
    format!(
        "Semangat, {}! 💪 Nggak apa-apa kalau hari ini terasa berat. Mulai dari langkah kecil, cukup 5 menit dulu.",
        ctx.user_name
    )
}

fn motivation_progress(ctx: &UserContext) -> String {
    format!(
        "Lihat deh, kamu sudah menyelesaikan {} tugas. Itu bukti kamu mampu! Tetap semangat, satu langkah lagi. 🌟",
        ctx.tasks_completed
    )
}

fn motivation_rest(_ctx: &UserContext) -> String {
    "Kalau lagi capek, istirahat sebentar itu bukan menyerah. Minum air, tarik napas, lalu lanjut lagi dengan semangat baru. ☀️"
        .to_string()
}

// ── Habits ─────────────────────────────────────────────────────────────────

const HABITS: &[Template] = &[habits_streak, habits_stacking, habits_tiny];

fn habits_streak(ctx: &UserContext) -> String {
    if ctx.streak > 0 {
        format!(
            "🔥 Streak kamu {} hari! Jaga terus dengan melakukan satu aktivitas kecil setiap hari.",
            ctx.streak
        )
    } else {
        "Streak kamu belum dimulai hari ini. Lakukan satu aktivitas kecil sekarang untuk memulai streak baru! 🔥"
            .to_string()
    }
}

fn habits_stacking(ctx: &UserContext) -> String {
    format!(
        "Coba habit stacking: tempelkan kebiasaan baru ke kebiasaan lama, misalnya baca 1 halaman setelah sarapan. Streak kamu saat ini {} hari.",
        ctx.streak
    )
}

fn habits_tiny(ctx: &UserContext) -> String {
    format!(
        "Kebiasaan besar lahir dari langkah kecil, {}. Mulai dari 2 menit per hari dan jangan putuskan streak-nya. Kamu sudah menulis {} jurnal, itu awal yang bagus!",
        ctx.user_name, ctx.journal_entries
    )
}

// ── Mental wellness ────────────────────────────────────────────────────────

const MENTAL_WELLNESS: &[Template] = &[mental_breathing, mental_journal, mental_sleep];

fn mental_breathing(_ctx: &UserContext) -> String {
    "🧘 Coba latihan napas 4-7-8: tarik napas 4 detik, tahan 7 detik, hembuskan 8 detik. Ulangi 4 kali. Perasaanmu valid, pelan-pelan saja."
        .to_string()
}

fn mental_journal(ctx: &UserContext) -> String {
    format!(
        "Menulis jurnal bisa membantu menenangkan pikiran. Kamu sudah punya {} catatan jurnal. Sebelum menulis, atur napas perlahan beberapa kali. 💙",
        ctx.journal_entries
    )
}

fn mental_sleep(ctx: &UserContext) -> String {
    format!(
        "Jaga dirimu, {}. Tidur cukup, kurangi layar sebelum tidur, dan latih napas dalam saat mulai cemas. Kalau terasa berat terus, jangan ragu bicara dengan orang terdekat atau profesional.",
        ctx.user_name
    )
}

// ── Time management ────────────────────────────────────────────────────────

const TIME_MANAGEMENT: &[Template] = &[time_matrix, time_today, time_blocking];

fn time_matrix(_ctx: &UserContext) -> String {
    "⏰ Pakai Matriks Eisenhower: kerjakan yang penting dan mendesak dulu, jadwalkan yang penting tapi tidak mendesak, delegasikan yang mendesak tapi tidak penting, dan hapus sisanya."
        .to_string()
}

fn time_today(ctx: &UserContext) -> String {
    format!(
        "Hari ini ada {} tugas yang menunggu. Urutkan dengan Matriks Eisenhower lalu kerjakan satu per satu, jangan multitasking. 📋",
        ctx.today_tasks
    )
}

fn time_blocking(ctx: &UserContext) -> String {
    format!(
        "Coba time blocking, {}: bagi harimu jadi blok waktu untuk tiap jenis pekerjaan. Tentukan prioritas dengan prinsip Eisenhower sebelum mengisi blok.",
        ctx.user_name
    )
}

// ── Goals ──────────────────────────────────────────────────────────────────

const GOALS: &[Template] = &[goals_smart, goals_breakdown, goals_review];

fn goals_smart(_ctx: &UserContext) -> String {
    "🎯 Susun tujuan dengan metode SMART: Specific, Measurable, Achievable, Relevant, dan Time-bound. Contoh: \"Menabung 500 ribu dalam 2 bulan\"."
        .to_string()
}

fn goals_breakdown(ctx: &UserContext) -> String {
    format!(
        "Pecah tujuan besarmu jadi target mingguan yang SMART, {}. Kamu sudah menyelesaikan {} tugas, tinggal arahkan ke tujuan yang jelas!",
        ctx.user_name, ctx.tasks_completed
    )
}

fn goals_review(_ctx: &UserContext) -> String {
    "Tulis tujuanmu, pastikan SMART, lalu evaluasi setiap akhir pekan: apa yang berhasil dan apa yang perlu diubah. 📈"
        .to_string()
}

// ── Identity ───────────────────────────────────────────────────────────────

const IDENTITY: &[Template] = &[identity_intro, identity_offline, identity_personal];

fn identity_intro(_ctx: &UserContext) -> String {
    "Aku asisten produktivitas pribadimu 🤖. Aku membantu soal belajar, keuangan, kebiasaan, kesehatan mental, dan manajemen waktu.".to_string()
}

fn identity_offline(_ctx: &UserContext) -> String {
    "Aku asisten virtual di aplikasi ini. Saat AI online tidak tersedia, aku tetap bisa memberi saran berdasarkan data aktivitasmu."
        .to_string()
}

fn identity_personal(ctx: &UserContext) -> String {
    format!(
        "Aku asisten produktivitas yang menemani {}. Aku melihat statistik aktivitasmu supaya sarannya lebih personal.",
        ctx.user_name
    )
}

// ── Fallback ───────────────────────────────────────────────────────────────

const FALLBACK: &[Template] = &[fallback_suggest, fallback_summary, fallback_examples];

fn fallback_suggest(ctx: &UserContext) -> String {
    format!(
        "Hmm, aku belum paham maksudmu, {}. 🤔 Coba tanya soal belajar, keuangan, kebiasaan, atau manajemen waktu.",
        ctx.user_name
    )
}

fn fallback_summary(ctx: &UserContext) -> String {
    format!(
        "Maaf {}, aku belum bisa menjawab itu. Sebagai gambaran, kamu punya {} sesi belajar, {} tugas selesai, dan streak {} hari. Mau bahas salah satunya?",
        ctx.user_name, ctx.study_sessions, ctx.tasks_completed, ctx.streak
    )
}

fn fallback_examples(ctx: &UserContext) -> String {
    format!(
        "Pertanyaan menarik, {}! Untuk sekarang aku paling jago di topik produktivitas. Coba \"tips menabung\", \"cara fokus belajar\", atau \"atasi stres\".",
        ctx.user_name
    )
}

// ── Document analysis ──────────────────────────────────────────────────────

pub const DOCUMENT: &[DocumentTemplate] = &[document_report, document_brief];

fn document_header(doc: &DocumentAnalysis) -> String {
    let mut header = format!("📄 Analisis dokumen: {}\nJumlah halaman: {}", doc.file_name, doc.page_count);
    if doc.is_truncated {
        header.push_str(&format!(" (hanya {} halaman pertama yang dibaca)", doc.pages_read));
    }
    if let Some(title) = &doc.title {
        header.push_str(&format!("\nJudul: {}", title));
    }
    header
}

fn summary_text(summary: &DocumentSummary) -> &str {
    summary
        .summary
        .as_deref()
        .unwrap_or("Dokumen ini tidak memiliki cukup teks untuk diringkas.")
}

fn document_report(ctx: &UserContext, doc: &DocumentAnalysis, summary: &DocumentSummary) -> String {
    format!(
        "{}\nJumlah kata: {} · Estimasi waktu baca: {} menit\n\nRingkasan:\n{}\n\nMau aku bantu buat jadwal belajar dari dokumen ini, {}?",
        document_header(doc),
        summary.word_count,
        summary.reading_minutes,
        summary_text(summary),
        ctx.user_name
    )
}

fn document_brief(ctx: &UserContext, doc: &DocumentAnalysis, summary: &DocumentSummary) -> String {
    format!(
        "{}\n\nIntinya:\n{}\n\nDokumen ini berisi sekitar {} kata, kira-kira {} menit membaca. Coba pecah jadi beberapa sesi Pomodoro ya, {}! 📚",
        document_header(doc),
        summary_text(summary),
        summary.word_count,
        summary.reading_minutes,
        ctx.user_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Money;

    fn ctx() -> UserContext {
        UserContext {
            user_name: "Dewi".to_string(),
            study_sessions: 4,
            tasks_completed: 7,
            journal_entries: 2,
            balance: Money(150_000.0),
            streak: 3,
            today_tasks: 2,
        }
    }

    #[test]
    fn test_every_text_intent_has_templates() {
        for intent in [
            Intent::Greeting,
            Intent::Capabilities,
            Intent::Study,
            Intent::Finance,
            Intent::Motivation,
            Intent::Habits,
            Intent::MentalWellness,
            Intent::TimeManagement,
            Intent::Goals,
            Intent::Identity,
            Intent::Fallback,
        ] {
            assert!(for_intent(intent).len() >= 3, "{:?}", intent);
        }
        assert!(for_intent(Intent::DocumentAnalysis).is_empty());
    }

    #[test]
    fn test_finance_templates_show_rule_and_balance() {
        for template in FINANCE {
            let text = template(&ctx());
            assert!(text.contains("50/30/20"));
            assert!(text.contains("Rp 150.000"));
        }
    }

    #[test]
    fn test_negative_balance_note() {
        let mut c = ctx();
        c.balance = Money(-20_000.0);
        let text = finance_balance(&c);
        assert!(text.contains("-Rp 20.000"));
        assert!(text.contains("lebih besar dari pemasukan"));
    }

    #[test]
    fn test_habits_without_streak() {
        let mut c = ctx();
        c.streak = 0;
        assert!(habits_streak(&c).contains("belum dimulai"));
    }

    #[test]
    fn test_document_templates_mention_truncation() {
        let doc = DocumentAnalysis {
            file_name: "modul.pdf".to_string(),
            page_count: 14,
            pages_read: 10,
            is_truncated: true,
            title: Some("Modul Statistik".to_string()),
            text: String::new(),
        };
        let summary = DocumentSummary {
            summary: None,
            segment_count: 0,
            word_count: 0,
            reading_minutes: 0,
        };
        for template in DOCUMENT {
            let text = template(&ctx(), &doc, &summary);
            assert!(text.contains("modul.pdf"));
            assert!(text.contains("hanya 10 halaman pertama"));
            assert!(text.contains("Judul: Modul Statistik"));
            assert!(text.contains("tidak memiliki cukup teks"));
        }
    }
}
