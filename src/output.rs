use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// Set `NLQE_QUIET=1` to drop banners and progress spinners
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("NLQE_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}
