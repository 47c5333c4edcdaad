//! Default Ukrainian translation bundles.
//!
//! Applied when a language is created without explicit strings, so a freshly
//! added language renders a complete widget out of the box. Admins can still
//! override any key at creation time.

use std::collections::BTreeMap;

const WIDGET_DEFAULTS: &[(&str, &str)] = &[
    ("tm", "Торгівельна марка"),
    ("selected", "Обрано"),
    ("reset_filters", "Скинути фільтри"),
    ("order_fasad", "Замовити фасад"),
    ("download_pdf", "Завантажити PDF"),
    ("colors", "Кольори"),
    ("about_tm", "Про торгівельну марку"),
    ("choose_fasad", "Обрати фасад"),
    (
        "fasad_description",
        "Тут ви можете побачити як фасад виглядатиме на будинках різного типу",
    ),
    (
        "start_description",
        "Для того, щоб почати — оберіть торгівельну марку, або бажаний колір фасаду",
    ),
    (
        "color_texture_hover",
        "Щоб побачити колір та текстуру фасаду більш детально — наведіть на будь-який доступний колір",
    ),
    ("zoom_image", "Збільшити фото для кращої деталізації"),
    ("choose_tm", "Обрати торгівельну марку"),
    (
        "color_texture_select",
        "Щоб побачити колір та текстуру фасаду більш детально — виберіть будь-який доступний колір",
    ),
    ("choose_house", "Оберіть тип будинку"),
    (
        "choose_step_second",
        "Гарний вибір! Лишилось обрати торгівельну марку, щоб побачити як колір виглядає на панелі обраної форми.",
    ),
    (
        "choose_step_third",
        "Тільки подивіться які гарні структури та кольори у цієї торгівельної марки!",
    ),
    ("view_3d", "Побачити 3D модель"),
    ("image_none", "Немає завантажених зображень"),
    ("mobile_pdf", "PDF"),
    ("mobile_filters", "скинути"),
];

const FORM_DEFAULTS: &[(&str, &str)] = &[
    (
        "leave_request",
        "Залиште заявку і менеджер надасть вам професійну консультацію вже сьогодні!",
    ),
    ("name", "Ім’я"),
    ("your_name", "Ваше ім’я"),
    ("phone_number", "Номер телефону"),
    ("email", "Ел.пошта"),
    (
        "data_protection",
        "Ваші дані будуть захищені. Ми використовуємо високоякісну систему безпеки.",
    ),
    ("color", "Колір"),
    ("tm", "Торгівельна марка"),
    ("house_type", "Тип будинку"),
    ("selected_fasad", "Обрано фасад"),
    ("get_consultation", "Отримати консультацію"),
    ("thank_you", "Дякуємо за ваш вибір! Менеджер зателефонує впродовж дня!"),
    ("ok", "Добре"),
    ("enter_phone", "Введіть номер телефону"),
    ("enter_email", "Введіть email"),
    ("enter_name", "Введіть ваше ім’я"),
    ("letter_header", "Нова заявка з віджету"),
    ("letter_subject", "Дякуємо за звернення!"),
    ("letter_thanku", "Дякуємо"),
    (
        "letter_feedback",
        "Ми отримали вашу заявку. Найближчим часом з вами зв’яжеться наш спеціаліст.",
    ),
    (
        "letter_pdf",
        "Ви можете завантажити PDF з інформацією про вибраний продукт",
    ),
];

fn to_bundle(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Full default `widget` bundle.
pub fn default_widget_bundle() -> BTreeMap<String, String> {
    to_bundle(WIDGET_DEFAULTS)
}

/// Full default `form` bundle.
pub fn default_form_bundle() -> BTreeMap<String, String> {
    to_bundle(FORM_DEFAULTS)
}
