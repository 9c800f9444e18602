//! `PreviewCapture` backends.
//!
//! Headless Chromium capture is compiled in with the `browser` feature.
//! Without it, raster exports fail with a notice instead of producing a
//! blank image.

use async_trait::async_trait;

use crate::export::raster::PreviewCapture;
use crate::export::ExportError;

/// Used when no browser backend is available.
#[derive(Debug, Default, Clone)]
pub struct UnavailableCapture;

#[async_trait]
impl PreviewCapture for UnavailableCapture {
    async fn capture(&self, _page_html: &str, _scale: f64) -> Result<Vec<u8>, ExportError> {
        Err(ExportError::CaptureUnavailable(
            "this build has no browser capture; rebuild with the `browser` feature".to_string(),
        ))
    }
}

#[cfg(feature = "browser")]
pub use browser::BrowserCapture;

#[cfg(feature = "browser")]
mod browser {
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
    use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
    use futures::StreamExt;
    use tracing::{debug, warn};

    use crate::export::raster::{PreviewCapture, PREVIEW_SELECTOR};
    use crate::export::ExportError;

    /// CSS viewport the preview is laid out in.
    const VIEWPORT_WIDTH: i64 = 1024;
    const VIEWPORT_HEIGHT: i64 = 1448;

    fn capture_err(e: impl std::fmt::Display) -> ExportError {
        ExportError::Capture(e.to_string())
    }

    /// Launches a headless browser per capture.
    #[derive(Debug, Default, Clone)]
    pub struct BrowserCapture;

    #[async_trait]
    impl PreviewCapture for BrowserCapture {
        async fn capture(&self, page_html: &str, scale: f64) -> Result<Vec<u8>, ExportError> {
            let config = BrowserConfig::builder()
                .build()
                .map_err(ExportError::CaptureUnavailable)?;
            let (mut browser, mut handler) = Browser::launch(config)
                .await
                .map_err(|e| ExportError::CaptureUnavailable(e.to_string()))?;
            let events = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let result = async {
                let page = browser.new_page("about:blank").await.map_err(capture_err)?;
                page.execute(SetDeviceMetricsOverrideParams::new(
                    VIEWPORT_WIDTH,
                    VIEWPORT_HEIGHT,
                    scale,
                    false,
                ))
                .await
                .map_err(capture_err)?;
                page.set_content(page_html).await.map_err(capture_err)?;

                let element = page
                    .find_element(PREVIEW_SELECTOR)
                    .await
                    .map_err(|_| ExportError::PreviewMissing)?;
                element
                    .screenshot(CaptureScreenshotFormat::Png)
                    .await
                    .map_err(capture_err)
            }
            .await;

            if let Err(e) = browser.close().await {
                warn!(error = %e, "Failed to close capture browser");
            }
            let _ = browser.wait().await;
            events.abort();

            if let Ok(png) = &result {
                debug!(bytes = png.len(), scale, "Preview captured");
            }
            result
        }
    }
}
