use muse_core::config::SiteOptions;

pub mod project_muse;

/// Every built-in site catalogue
pub fn get_sites() -> Vec<SiteOptions> {
    vec![project_muse::site_options()]
}

/// The catalogue used when no `--sites` override is given
pub fn default_site() -> SiteOptions {
    project_muse::site_options()
}

/// Find a built-in site by name, ignoring case
pub fn find_site(name: &str) -> Option<SiteOptions> {
    get_sites()
        .into_iter()
        .find(|site| site.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_sites() {
        let sites = get_sites();
        assert!(!sites.is_empty());
        for site in &sites {
            assert!(site.validate().is_ok(), "{} has an invalid URL", site.name);
            assert!(!site.journal_links.is_empty());
        }
    }

    #[test]
    fn test_find_site() {
        assert_eq!(find_site("project muse").unwrap().base_url, "https://muse.jhu.edu");
        assert!(find_site("jstor").is_none());
    }
}
