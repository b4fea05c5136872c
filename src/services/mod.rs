pub mod discussion_service;
