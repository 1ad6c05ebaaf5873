use crate::data_model::InputFile;
use crate::error::Result;

pub trait BaseReader {
    fn read_files(&self) -> Result<Box<dyn Iterator<Item = Result<InputFile>>>>;
}
