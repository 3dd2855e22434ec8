//! Read-only track operations. None of these need a token.

use crate::client::{Auth, TrackerClient};
use reqwest::Method;
use rikitraki_shared::Result;

impl TrackerClient {
    /// Raw JSON for one track, or the track listing when `id` is `None`.
    /// Non-success statuses, including 404, are errors.
    pub async fn get_track(&self, id: Option<&str>) -> Result<String> {
        let url = self.url(&["api", "v1", "tracks", id.unwrap_or("")])?;
        let request = self.request(Method::GET, &url, Auth::None).await?;
        let response = self.dispatch(Method::GET, &url, request).await?;
        Ok(response.text().await?)
    }

    /// Raw JSON listing of all tracks
    pub async fn list_tracks(&self) -> Result<String> {
        self.get_track(None).await
    }

    /// GPX export of a track
    pub async fn get_track_gpx(&self, id: &str) -> Result<String> {
        let url = self.url(&["api", "v1", "tracks", id, "GPX"])?;
        let request = self.request(Method::GET, &url, Auth::None).await?;
        let response = self.dispatch(Method::GET, &url, request).await?;
        Ok(response.text().await?)
    }
}
