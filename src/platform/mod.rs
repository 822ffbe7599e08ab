// Integration with the device-side pose detector

pub mod pose;
