//! Inline keyboard builders for interactive bot menus

use getstocks::TypeOption;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use url::Url;

use crate::callbacks;
use crate::constants::emoji;

/// One button per downloadable type, each pointing back at the pending selection
///
/// # Arguments
/// * `selection_id` - Id of the stored pending selection
/// * `types` - Types offered by the provider, in display order
pub fn type_selection_keyboard(selection_id: &str, types: &[TypeOption]) -> InlineKeyboardMarkup {
    let buttons = types
        .iter()
        .enumerate()
        .map(|(index, option)| {
            vec![InlineKeyboardButton::callback(
                option.label.clone(),
                callbacks::type_callback_data(selection_id, index),
            )]
        })
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(buttons)
}

/// A single "Download" button opening the finished file.
///
/// Returns `None` when the provider gave us something that is not a URL.
pub fn download_keyboard(download_link: &str) -> Option<InlineKeyboardMarkup> {
    let url = Url::parse(download_link).ok()?;
    Some(InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        format!("{} Download", emoji::DOWNLOAD),
        url,
    )]]))
}
