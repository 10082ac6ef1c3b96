use crate::config::Config;

pub const PROVIDER_DOMAIN: &str = "online.tableau.com";

pub fn url(region: &str, site_id: &str, workbook: &str, worksheet: &str) -> String {
    format!(
        "https://{}.{}/#/site/{}/views/{}/{}",
        region, PROVIDER_DOMAIN, site_id, workbook, worksheet
    )
}

pub fn url_for(config: &Config) -> String {
    url(
        &config.region,
        &config.site_id,
        &config.workbook,
        &config.worksheet,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample_config;

    #[test]
    fn url_test() {
        assert_eq!(
            "https://10ay.online.tableau.com/#/site/sitename/views/Superstore/Overview",
            url("10ay", "sitename", "Superstore", "Overview")
        );
    }

    #[test]
    fn url_for_config_test() {
        assert_eq!(
            "https://10ay.online.tableau.com/#/site/sitename/views/Superstore/Overview",
            url_for(&sample_config())
        );
    }
}
