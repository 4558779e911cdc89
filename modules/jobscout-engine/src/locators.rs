//! XPath locators for the job listing page. A listing is a column of cards;
//! clicking a card renders its detail pane alongside.

pub const CARD_CONTAINER: &str = "//div[contains(@data-testid, 'slider_container')]";
pub const CARD_TITLE: &str = ".//a[contains(@class, 'jcs-JobTitle')]";
pub const CARD_COMPANY: &str = ".//span[contains(@data-testid, 'company-name')]";
pub const CARD_LOCATION: &str = ".//div[contains(@data-testid, 'text-location')]";
pub const CARD_POSTING_AGE: &str = ".//span[contains(@data-testid, 'myJobsStateDate')]";

pub const DETAIL_PANE: &str = "//div[contains(@class, 'jobsearch-JobComponent')]";
pub const DETAIL_DESCRIPTION: &str = "//div[contains(@id, 'jobDescriptionText')]";
pub const DETAIL_SALARY_CONTAINER: &str = "//div[contains(@id, 'salaryInfoAndJobType')]";
pub const INNER_SPAN: &str = ".//span";
