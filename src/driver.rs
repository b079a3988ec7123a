//! The invoicing driver: authenticate, open the invoice generator and submit
//! one invoice per chunk until the requested total is exhausted.
//!
//! Everything is strictly sequential. Each navigation-triggering action
//! blocks until the page settles before the next step runs, and each invoice
//! submission walks a fixed sequence of form screens. There are no retries:
//! an expected control missing on a settled page is a terminal error for the
//! run (see DESIGN.md for the abort-vs-continue decision).

use crate::{
    browser::PortalSession,
    config::Config,
    error::{InvoiceError, Result},
    invoice::{chunk_amounts, InvoiceRequest},
};
use headless_chrome::Tab;
use log::{debug, error, info};
use rust_decimal::Decimal;
use std::{fmt, sync::Arc, thread, time::Duration};

/// Stage of the submission flow, used to tag errors and log lines with the
/// failing screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Login,
    OpenGenerator,
    NewInvoice,
    PointOfSale,
    EmissionData,
    CustomerData,
    DescriptionAndAmount,
    Generate,
    MainMenu,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Login => "login",
            Stage::OpenGenerator => "open-generator",
            Stage::NewInvoice => "new-invoice",
            Stage::PointOfSale => "point-of-sale",
            Stage::EmissionData => "emission-data",
            Stage::CustomerData => "customer-data",
            Stage::DescriptionAndAmount => "description-and-amount",
            Stage::Generate => "generate",
            Stage::MainMenu => "main-menu",
        };
        f.write_str(name)
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub invoices_submitted: u64,
    pub total_invoiced: Decimal,
}

/// Drives the portal end to end for one invoicing request.
pub struct InvoicingDriver {
    session: PortalSession,
    config: Config,
}

impl InvoicingDriver {
    pub fn new(session: PortalSession, config: Config) -> Self {
        Self { session, config }
    }

    /// Run the full flow: log in, open the generator, submit one invoice per
    /// chunk, tear the session down.
    ///
    /// A failed submission aborts the run: a mid-form failure leaves the tab
    /// off the main menu, so later chunks would fail against wrong-screen
    /// selectors. Invoices already submitted stay submitted; the summary of
    /// how many is in the log.
    pub fn run(&self, request: &InvoiceRequest) -> Result<RunSummary> {
        let login_tab = self.session.first_tab()?;

        self.login(&login_tab, request)
            .map_err(|e| InvoiceError::Authentication(e.to_string()))?;
        info!("Logged in to the portal");

        let invoice_tab = self.open_invoice_generator(&login_tab)?;

        let chunks = chunk_amounts(request.total, self.config.max_invoice_amount);
        info!("[START] Creating {} invoices for a total of {}", chunks.len(), request.total);

        let mut summary = RunSummary { invoices_submitted: 0, total_invoiced: Decimal::ZERO };

        for (i, amount) in chunks.iter().enumerate() {
            info!("Creating invoice {}/{} with amount {}", i + 1, chunks.len(), amount);

            if let Err(e) = self.submit_invoice(&invoice_tab, *amount, request) {
                error!(
                    "Failed to create invoice {}/{} ({} invoices already submitted): {}",
                    i + 1,
                    chunks.len(),
                    summary.invoices_submitted,
                    e
                );
                let _ = self.session.close();
                return Err(e);
            }

            summary.invoices_submitted += 1;
            summary.total_invoiced += *amount;
            info!("Invoice {}/{} created", i + 1, chunks.len());
        }

        info!(
            "[FINISH] {} invoices created, {} invoiced",
            summary.invoices_submitted, summary.total_invoiced
        );
        self.session.close()?;

        Ok(summary)
    }

    /// Two-screen portal login: username, then password, same submit button.
    fn login(&self, tab: &Arc<Tab>, request: &InvoiceRequest) -> Result<()> {
        let map = &self.config.portal;

        self.session.navigate(tab, &map.login_url, Stage::Login)?;
        self.session.wait_for_navigation(tab, Stage::Login)?;

        self.session
            .type_text(tab, &map.username_input, &self.config.credentials.cuit, request.pace, Stage::Login)?;
        self.session.click(tab, &map.login_submit, Stage::Login)?;
        self.session.wait_for_navigation(tab, Stage::Login)?;

        self.session
            .type_text(tab, &map.password_input, &self.config.credentials.password, request.pace, Stage::Login)?;
        self.session.click(tab, &map.login_submit, Stage::Login)?;
        self.session.wait_for_navigation(tab, Stage::Login)?;

        Ok(())
    }

    /// Open the invoice generator. The portal spawns it in a second tab;
    /// that tab is used for every submission afterwards.
    fn open_invoice_generator(&self, tab: &Arc<Tab>) -> Result<Arc<Tab>> {
        let map = &self.config.portal;

        self.session.click_xpath(tab, &map.online_invoicing_link, Stage::OpenGenerator)?;

        // Give the portal a moment to spawn the new tab
        thread::sleep(Duration::from_secs(1));

        let invoice_tab = self.session.newest_tab()?;
        self.session.wait_for_element(&invoice_tab, &map.company_button, Stage::OpenGenerator)?;
        self.session.click(&invoice_tab, &map.company_button, Stage::OpenGenerator)?;
        self.session.wait_for_navigation(&invoice_tab, Stage::OpenGenerator)?;

        Ok(invoice_tab)
    }

    /// Submit a single invoice of `amount`, walking the fixed screen
    /// sequence from the generator main menu back to the generator main menu.
    fn submit_invoice(&self, tab: &Arc<Tab>, amount: Decimal, request: &InvoiceRequest) -> Result<()> {
        self.enter_generator(tab)?;
        self.dismiss_onboarding_modal(tab);
        self.select_point_of_sale(tab)?;
        self.set_emission_data(tab)?;
        self.set_customer_data(tab)?;
        self.set_description_and_amount(tab, amount, request)?;
        self.confirm_generation(tab)?;
        self.return_to_main_menu(tab)?;
        Ok(())
    }

    fn enter_generator(&self, tab: &Arc<Tab>) -> Result<()> {
        let map = &self.config.portal;

        self.session.click_xpath(tab, &map.new_invoice_link, Stage::NewInvoice)?;
        self.session.wait_for_navigation(tab, Stage::NewInvoice)?;
        Ok(())
    }

    /// Close the one-time "Nombre de fantasía" modal if the portal shows it.
    /// Its absence is normal on every entry after the first.
    fn dismiss_onboarding_modal(&self, tab: &Arc<Tab>) {
        let selector = &self.config.portal.onboarding_dismiss;

        if self.session.element_exists(tab, selector) {
            debug!("Dismissing one-time informational modal");
            if let Err(e) = self.session.click(tab, selector, Stage::NewInvoice) {
                debug!("Modal dismissal failed, continuing: {}", e);
            }
        }
    }

    fn select_point_of_sale(&self, tab: &Arc<Tab>) -> Result<()> {
        let map = &self.config.portal;

        self.session
            .select_value(tab, &map.point_of_sale_select, &self.config.choices.point_of_sale, Stage::PointOfSale)?;

        // The portal re-renders the invoice-type field after this selection
        thread::sleep(Duration::from_millis(300));

        self.advance(tab, Stage::PointOfSale)
    }

    fn set_emission_data(&self, tab: &Arc<Tab>) -> Result<()> {
        let map = &self.config.portal;
        let choices = &self.config.choices;

        self.session
            .select_value(tab, &map.concept_select, &choices.concept, Stage::EmissionData)?;
        self.session
            .select_option_index(tab, &map.activity_select, choices.activity_option_index, Stage::EmissionData)?;

        self.advance(tab, Stage::EmissionData)
    }

    fn set_customer_data(&self, tab: &Arc<Tab>) -> Result<()> {
        let map = &self.config.portal;

        self.session
            .select_value(tab, &map.tax_condition_select, &self.config.choices.tax_condition, Stage::CustomerData)?;
        self.session
            .click(tab, &map.payment_method_checkbox, Stage::CustomerData)?;

        self.advance(tab, Stage::CustomerData)
    }

    fn set_description_and_amount(&self, tab: &Arc<Tab>, amount: Decimal, request: &InvoiceRequest) -> Result<()> {
        let map = &self.config.portal;

        self.session.type_text(
            tab,
            &map.description_input,
            &request.description,
            request.pace,
            Stage::DescriptionAndAmount,
        )?;
        self.session.type_text(
            tab,
            &map.amount_input,
            &amount.to_string(),
            request.pace,
            Stage::DescriptionAndAmount,
        )?;

        self.advance(tab, Stage::DescriptionAndAmount)
    }

    /// Generate the invoice. The generate button raises a confirm dialog;
    /// it is armed to accept right before the click, as an explicit step.
    fn confirm_generation(&self, tab: &Arc<Tab>) -> Result<()> {
        let map = &self.config.portal;

        self.session.arm_confirm_dialog(tab, Stage::Generate)?;
        self.session.click(tab, &map.generate_button, Stage::Generate)?;
        self.session.wait_for_navigation(tab, Stage::Generate)?;
        Ok(())
    }

    fn return_to_main_menu(&self, tab: &Arc<Tab>) -> Result<()> {
        let map = &self.config.portal;

        self.session.click(tab, &map.main_menu_button, Stage::MainMenu)?;
        self.session.wait_for_navigation(tab, Stage::MainMenu)?;
        Ok(())
    }

    /// Click the screen's continue button and wait for the next screen.
    fn advance(&self, tab: &Arc<Tab>, stage: Stage) -> Result<()> {
        self.session.click(tab, &self.config.portal.continue_button, stage)?;
        self.session.wait_for_navigation(tab, stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display_names() {
        assert_eq!(Stage::Login.to_string(), "login");
        assert_eq!(Stage::PointOfSale.to_string(), "point-of-sale");
        assert_eq!(Stage::DescriptionAndAmount.to_string(), "description-and-amount");
        assert_eq!(Stage::MainMenu.to_string(), "main-menu");
    }

    #[test]
    fn test_stage_tagged_error_message() {
        let err = InvoiceError::ElementNotFound {
            stage: Stage::CustomerData,
            selector: "#idivareceptor".to_string(),
            reason: "node not found".to_string(),
        };

        let message = err.to_string();
        assert!(message.contains("customer-data"));
        assert!(message.contains("#idivareceptor"));
    }
}
