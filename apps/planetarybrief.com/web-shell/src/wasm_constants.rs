pub(crate) const ARTICLES_ENDPOINT_OVERRIDE_KEY: &str = "__PB_ARTICLES_ENDPOINT__";
pub(crate) const BOOT_STATUS_ELEMENT_ID: &str = "planetary-brief-boot-status";
pub(crate) const LOG_PREFIX: &str = "[planetary-brief]";
