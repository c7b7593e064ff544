pub mod ky_http;
