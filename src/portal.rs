//! Declarative map of the portal's UI contract.
//!
//! The portal is an opaque, versioned UI surface: specific form-field ids,
//! button classes, multi-tab navigation, a one-time dismissible modal and a
//! confirmation dialog. Everything the driver touches is named here, so a
//! change to the portal's markup is an edit to this table (or a config-file
//! override), not to the orchestration logic.

use serde::Deserialize;

/// Named URLs and selectors for every control the invoicing flow touches.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortalMap {
    /// Login page URL
    pub login_url: String,

    /// Username field on the first login screen
    pub username_input: String,
    /// Password field on the second login screen
    pub password_input: String,
    /// Submit button, shared by both login screens
    pub login_submit: String,

    /// XPath of the main-menu link that opens the invoice generator in a new tab
    pub online_invoicing_link: String,
    /// Issuing-entity button on the generator's landing page
    pub company_button: String,
    /// XPath of the generator menu entry that starts a new invoice
    pub new_invoice_link: String,
    /// Dismissal checkbox of the one-time informational modal, if shown
    pub onboarding_dismiss: String,

    /// Point-of-sale dropdown (screen 1)
    pub point_of_sale_select: String,
    /// Concept dropdown: goods, services or both (screen 2)
    pub concept_select: String,
    /// Associated-activity dropdown (screen 2)
    pub activity_select: String,
    /// Customer tax-condition dropdown (screen 3)
    pub tax_condition_select: String,
    /// Payment-method checkbox (screen 3)
    pub payment_method_checkbox: String,
    /// Line-item description field (screen 4)
    pub description_input: String,
    /// Line-item amount field (screen 4)
    pub amount_input: String,

    /// "Continuar >" button advancing each form screen
    pub continue_button: String,
    /// Final generate button on the summary screen; raises a confirm dialog
    pub generate_button: String,
    /// Button returning to the generator main menu
    pub main_menu_button: String,
}

impl Default for PortalMap {
    fn default() -> Self {
        Self {
            login_url: "https://auth.afip.gob.ar/contribuyente_/login.xhtml".to_string(),
            username_input: "#F1\\:username".to_string(),
            password_input: "#F1\\:password".to_string(),
            login_submit: ".btn.btn-info.full-width.m-y-1".to_string(),
            online_invoicing_link: "//a[contains(., 'Comprobantes en línea')]".to_string(),
            company_button: ".btn_empresa".to_string(),
            new_invoice_link: "//a[contains(., 'Generar Comprobantes')]".to_string(),
            onboarding_dismiss: "#novolveramostrar".to_string(),
            point_of_sale_select: "#puntodeventa".to_string(),
            concept_select: "#idconcepto".to_string(),
            activity_select: "#actiAsociadaId".to_string(),
            tax_condition_select: "#idivareceptor".to_string(),
            payment_method_checkbox: "#formadepago7".to_string(),
            description_input: "#detalle_descripcion1".to_string(),
            amount_input: "#detalle_precio1".to_string(),
            continue_button: "input[value='Continuar >']".to_string(),
            generate_button: "#btngenerar".to_string(),
            main_menu_button: "input[value='Menú Principal']".to_string(),
        }
    }
}

/// Values picked on the form screens.
///
/// Concept "2" is Servicios ("1" Productos, "3" both); tax condition "5" is
/// Consumidor final; the payment-method checkbox in [`PortalMap`] is "Otra".
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormChoices {
    /// Value of the point-of-sale option to issue from
    pub point_of_sale: String,

    /// Concept classification of the invoice
    pub concept: String,

    /// Position of the associated activity to pick (0 is the placeholder)
    pub activity_option_index: usize,

    /// Customer tax-condition value
    pub tax_condition: String,
}

impl Default for FormChoices {
    fn default() -> Self {
        Self {
            point_of_sale: "1".to_string(),
            concept: "2".to_string(),
            activity_option_index: 1,
            tax_condition: "5".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_map_matches_portal_markup() {
        let map = PortalMap::default();

        assert_eq!(map.username_input, "#F1\\:username");
        assert_eq!(map.point_of_sale_select, "#puntodeventa");
        assert_eq!(map.amount_input, "#detalle_precio1");
        assert!(map.login_url.starts_with("https://auth.afip.gob.ar/"));
        assert!(map.online_invoicing_link.starts_with("//a"));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let map: PortalMap =
            serde_json::from_str(r##"{"company_button": ".btn_empresa_v2"}"##).unwrap();

        assert_eq!(map.company_button, ".btn_empresa_v2");
        assert_eq!(map.generate_button, "#btngenerar");
    }

    #[test]
    fn test_default_choices() {
        let choices = FormChoices::default();

        assert_eq!(choices.concept, "2");
        assert_eq!(choices.tax_condition, "5");
        assert_eq!(choices.activity_option_index, 1);
    }
}
