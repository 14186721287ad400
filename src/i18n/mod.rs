//! i18n - Internationalization Module
//!
//! Provides simple translation functions using HashMap-based lookups.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Supported locales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Ru => "Русский",
        }
    }

    /// Parse a language tag such as "ru", "ru-RU" or "en_US"
    pub fn from_tag(tag: &str) -> Option<Self> {
        let lang = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match lang.as_str() {
            "en" => Some(Locale::En),
            "ru" => Some(Locale::Ru),
            _ => None,
        }
    }

    /// Configured tag, then the system locale, then English
    pub fn resolve(configured: Option<&str>) -> Self {
        if let Some(locale) = configured.and_then(Self::from_tag) {
            return locale;
        }
        let system = locale_config::Locale::current().to_string();
        let locale = Self::from_tag(&system).unwrap_or_default();
        tracing::debug!(system = %system, locale = ?locale, "Resolved locale");
        locale
    }
}

/// Translation resources
static TRANSLATIONS: OnceLock<HashMap<&'static str, (&'static str, &'static str)>> = OnceLock::new();

/// Initialize translations (key -> (en, ru))
fn init_translations() -> HashMap<&'static str, (&'static str, &'static str)> {
    let mut map = HashMap::new();

    // App
    map.insert("app-title", ("Clinic Booking", "Запись на приём"));

    // Steps
    map.insert("step-select-doctor", ("Choose a doctor", "Выбор врача"));
    map.insert("step-select-datetime", ("Date and time", "Дата и время"));
    map.insert("step-patient-info", ("Patient details", "Данные пациента"));
    map.insert("step-confirm", ("Confirmation", "Подтверждение"));
    map.insert("step-success", ("Booked", "Запись создана"));

    // Fields
    map.insert("field-specialty", ("Specialty", "Специальность"));
    map.insert("field-search", ("Search", "Поиск"));
    map.insert("field-doctor", ("Doctor", "Врач"));
    map.insert("field-date", ("Date", "Дата"));
    map.insert("field-time", ("Time", "Время"));
    map.insert("field-patient", ("Patient", "Пациент"));
    map.insert("field-phone", ("Phone", "Телефон"));
    map.insert("field-gender", ("Gender", "Пол"));
    map.insert("field-comment", ("Comment", "Комментарий"));
    map.insert("field-price", ("Price", "Стоимость"));
    map.insert("field-consent", ("Consent", "Согласие"));
    map.insert("specialty-all", ("All specialties", "Все специальности"));
    map.insert("gender-male", ("Male", "Мужской"));
    map.insert("gender-female", ("Female", "Женский"));

    // Slots
    map.insert("slots-loading", ("Loading slots...", "Загрузка времени..."));
    map.insert("slots-empty", ("No slots for this date", "Нет свободного времени"));
    map.insert("slot-available", ("free", "свободно"));
    map.insert("slot-taken", ("taken", "занято"));

    // Verification
    map.insert("verify-verified", ("Phone verified", "Телефон подтверждён"));
    map.insert("verify-resend-in", ("Resend available in", "Повторная отправка через"));
    map.insert("verify-resend-ready", ("You can resend the code", "Можно отправить код повторно"));
    map.insert("verify-checking", ("Checking code...", "Проверка кода..."));
    map.insert("verify-invalid", ("Invalid code", "Неверный код"));

    // Block reasons
    map.insert("block-no-doctor", ("Select a doctor", "Выберите врача"));
    map.insert("block-no-date", ("Select a date", "Выберите дату"));
    map.insert("block-date-out-of-range", ("Date is outside the booking window", "Дата вне диапазона записи"));
    map.insert("block-no-time", ("Select a time", "Выберите время"));
    map.insert("block-slot-unavailable", ("This time is not available", "Это время недоступно"));
    map.insert("block-missing-name", ("Enter first and last name", "Введите имя и фамилию"));
    map.insert("block-invalid-phone", ("Enter a valid phone number", "Введите корректный номер телефона"));
    map.insert("block-phone-not-verified", ("Verify the phone number", "Подтвердите номер телефона"));
    map.insert("block-consent-required", ("Consent is required", "Необходимо согласие"));
    map.insert("block-submitting", ("Booking in progress", "Запись отправляется"));
    map.insert("block-done", ("Booking complete", "Запись завершена"));

    // Toasts
    map.insert("toast-code-sent", ("Verification code sent", "Код подтверждения отправлен"));
    map.insert("toast-code-send-failed", ("Could not send the code", "Не удалось отправить код"));
    map.insert("toast-phone-verified", ("Phone verified", "Телефон подтверждён"));
    map.insert("toast-code-invalid", ("Invalid verification code", "Неверный код подтверждения"));
    map.insert("toast-verification-reset", ("Phone changed, verify again", "Телефон изменён, подтвердите снова"));
    map.insert("toast-slots-failed", ("Could not load time slots", "Не удалось загрузить время"));
    map.insert("toast-booking-created", ("Appointment booked", "Вы записаны на приём"));
    map.insert("toast-booking-failed", ("Booking failed", "Не удалось записаться"));
    map.insert("toast-doctors-failed", ("Could not load doctors", "Не удалось загрузить врачей"));
    map.insert("toast-doctor-saved", ("Doctor saved", "Врач сохранён"));
    map.insert("toast-doctor-invalid", ("Doctor details are incomplete", "Данные врача неполные"));
    map.insert("toast-doctor-deleted", ("Doctor deleted", "Врач удалён"));
    map.insert("toast-schedule-saved", ("Schedule saved", "Расписание сохранено"));
    map.insert("toast-schedule-invalid", ("Schedule is invalid", "Расписание некорректно"));
    map.insert("toast-status-updated", ("Appointment updated", "Запись обновлена"));
    map.insert("toast-request-failed", ("Request failed", "Ошибка запроса"));

    // Schedule
    map.insert("schedule-weekly-hours", ("Hours per week", "Часов в неделю"));
    map.insert("schedule-day-off", ("day off", "выходной"));
    map.insert("schedule-blocked", ("Blocked dates", "Заблокированные даты"));
    map.insert("special-holiday", ("Holiday", "Праздник"));
    map.insert("special-conference", ("Conference", "Конференция"));
    map.insert("special-sick-leave", ("Sick leave", "Больничный"));
    map.insert("special-vacation", ("Vacation", "Отпуск"));

    // Appointment statuses
    map.insert("status-confirmed", ("Confirmed", "Подтверждена"));
    map.insert("status-pending", ("Pending", "Ожидает"));
    map.insert("status-cancelled", ("Cancelled", "Отменена"));
    map.insert("status-completed", ("Completed", "Завершена"));
    map.insert("status-no-show", ("No show", "Неявка"));

    // Appointments board
    map.insert("board-today", ("Today", "Сегодня"));
    map.insert("board-upcoming", ("Upcoming", "Предстоящие"));
    map.insert("board-past", ("Past", "Прошедшие"));
    map.insert("board-stats", ("Statistics", "Статистика"));

    // Console
    map.insert("console-help", ("Commands", "Команды"));
    map.insert("console-unknown", ("Unknown command, type 'help'", "Неизвестная команда, введите 'help'"));
    map.insert("console-blocked", ("Cannot continue", "Нельзя продолжить"));
    map.insert("console-bye", ("Goodbye", "До свидания"));

    map
}

/// Get translations
fn translations() -> &'static HashMap<&'static str, (&'static str, &'static str)> {
    TRANSLATIONS.get_or_init(init_translations)
}

/// Translate a key
pub fn t(locale: Locale, key: &str) -> String {
    if let Some(&(en, ru)) = translations().get(key) {
        match locale {
            Locale::En => en.to_string(),
            Locale::Ru => ru.to_string(),
        }
    } else {
        // Fallback: return the key itself
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_and_fallback() {
        assert_eq!(t(Locale::En, "step-confirm"), "Confirmation");
        assert_eq!(t(Locale::Ru, "status-pending"), "Ожидает");
        assert_eq!(t(Locale::Ru, "no-such-key"), "no-such-key");
    }

    #[test]
    fn test_locale_tags() {
        assert_eq!(Locale::from_tag("ru-RU"), Some(Locale::Ru));
        assert_eq!(Locale::from_tag("en_US"), Some(Locale::En));
        assert_eq!(Locale::from_tag("kk"), None);
        assert_eq!(Locale::resolve(Some("ru")), Locale::Ru);
    }
}
