pub mod render_job;
