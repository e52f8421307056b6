// Trigger a browser download for generated bytes

use wasm_bindgen::JsCast;

use crate::errors::UiError;

fn browser_error(what: &str) -> UiError {
    UiError::BrowserError(what.to_string())
}

/// Wrap `bytes` in a Blob and click a temporary anchor
pub fn download_bytes(bytes: &[u8], mime_type: &str, filename: &str) -> Result<(), UiError> {
    let blob_parts = js_sys::Array::new();
    let uint8_array = js_sys::Uint8Array::from(bytes);
    blob_parts.push(&uint8_array);

    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime_type);

    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&blob_parts, &options)
        .map_err(|_| browser_error("Blobを作成できません"))?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)
        .map_err(|_| browser_error("ダウンロードURLを作成できません"))?;

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| browser_error("documentがありません"))?;
    let anchor = document
        .create_element("a")
        .map_err(|_| browser_error("リンク要素を作成できません"))?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| browser_error("リンク要素を作成できません"))?;

    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();

    web_sys::Url::revoke_object_url(&url).map_err(|_| browser_error("ダウンロードURLを解放できません"))
}
