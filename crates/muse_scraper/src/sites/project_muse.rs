use muse_core::config::{JournalConfig, Position, Selectors, SiteOptions, TriggerConfig};

const BASE_URL: &str = "https://muse.jhu.edu";

fn journal(name: &str, href: &str) -> JournalConfig {
    JournalConfig {
        name: name.to_string(),
        href: href.to_string(),
        selectors: None,
    }
}

pub fn site_options() -> SiteOptions {
    SiteOptions {
        name: "Project MUSE".to_string(),
        base_url: BASE_URL.to_string(),
        journal_links: vec![
            journal("AJS Review", "https://muse.jhu.edu/pub/56/journal/844"),
            journal("Jewish Quarterly Review", "https://muse.jhu.edu/pub/56/journal/292"),
            journal("Journal of Biblical Literature", "https://muse.jhu.edu/pub/138/journal/513"),
        ],
        selectors: Selectors {
            title: ".title".to_string(),
            volume: "div.volume".to_string(),
            pdf_link: r#"a[href$="/pdf"]"#.to_string(),
        },
        // The PDF viewer has no addressable download control; this is the
        // toolbar button at the default 1280x800 viewport.
        download: TriggerConfig {
            click_position: Some(Position { x: 1180.0, y: 25.0 }),
            ..TriggerConfig::default()
        },
    }
}
