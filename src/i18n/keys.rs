/// Keys the embeddable widget UI reads from the `widget` bundle.
pub const WIDGET_KEYS: &[&str] = &[
    "tm",
    "selected",
    "reset_filters",
    "order_fasad",
    "download_pdf",
    "colors",
    "about_tm",
    "choose_fasad",
    "fasad_description",
    "start_description",
    "color_texture_hover",
    "zoom_image",
    "choose_tm",
    "color_texture_select",
    "choose_house",
    "choose_step_second",
    "choose_step_third",
    "view_3d",
    "image_none",
    "mobile_pdf",
    "mobile_filters",
];

/// Keys the order form and the relayed emails read from the `form` bundle.
pub const FORM_KEYS: &[&str] = &[
    "leave_request",
    "name",
    "your_name",
    "phone_number",
    "email",
    "data_protection",
    "color",
    "tm",
    "house_type",
    "selected_fasad",
    "get_consultation",
    "thank_you",
    "ok",
    "enter_phone",
    "enter_email",
    "enter_name",
    "letter_header",
    "letter_subject",
    "letter_thanku",
    "letter_feedback",
    "letter_pdf",
];
