mod app_segments;
mod segments;
