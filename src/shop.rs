// ============================================================================
// SHOP — open a garment's product page with the OS default handler
// ============================================================================

use crate::error::{StudioError, StudioResult};

/// Hand a product link to the OS. Only http(s) links are opened.
pub fn open_product_page(url: &str) -> StudioResult<()> {
    if !is_web_link(url) {
        log::warn!("Refusing to open non-web product link {}", url);
        return Err(StudioError::MissingLink);
    }
    log::info!("Opening product page {}", url);
    open_with_os(url)
}

fn is_web_link(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("https://") || url.starts_with("http://")
}

#[cfg(target_os = "windows")]
fn open_with_os(url: &str) -> StudioResult<()> {
    // The empty string is the window title `start` expects first
    std::process::Command::new("cmd")
        .args(["/C", "start", "", url])
        .spawn()?;
    Ok(())
}

#[cfg(target_os = "macos")]
fn open_with_os(url: &str) -> StudioResult<()> {
    std::process::Command::new("open").arg(url).spawn()?;
    Ok(())
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn open_with_os(url: &str) -> StudioResult<()> {
    std::process::Command::new("xdg-open").arg(url).spawn()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_web_links_are_opened() {
        assert!(is_web_link("https://shop.example/shirt"));
        assert!(is_web_link(" http://shop.example "));
        assert!(!is_web_link("file:///etc/passwd"));
        assert!(matches!(open_product_page("javascript:alert(1)"), Err(StudioError::MissingLink)));
    }
}
