//! Startup banner and end-of-session summary.

use crate::consts::{AUTHOR, HOMEPAGE, REPO, format_number};

pub struct BannerInfo<'a> {
    pub questions: &'a str,
    pub lookup_url: &'a str,
    pub storage: &'a str,
    pub min_input_len: usize,
    pub separator: &'a str,
}

pub fn banner_text(info: &BannerInfo) -> String {
    format!(
        r#"
   ╔═══════════════════════════════════════╗
   ║             S C R I B E               ║
   ║   one thought at a time, in writing   ║
   ╚═══════════════════════════════════════╝

   version    {}
   by         {}
   home       {}
   repo       {}
   questions  {}
   lookup     {}
   storage    {}
   input      at least {} char(s), context joined with {:?}

   type /help for commands
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        HOMEPAGE,
        REPO,
        info.questions,
        info.lookup_url,
        info.storage,
        info.min_input_len,
        info.separator,
    )
}

pub fn print_banner(info: &BannerInfo) {
    println!("{}", banner_text(info));
}

/// `saved` counts traces stored during this run; `total` the whole store.
pub fn print_session_summary(saved: u64, total: u64) {
    if saved > 0 {
        println!(
            "session: {} trace(s) saved, {} in store",
            format_number(saved),
            format_number(total)
        );
    }
    println!("goodbye.");
}
