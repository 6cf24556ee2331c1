#[cfg(test)]
mod engine_test;
#[cfg(test)]
mod parser_test;
#[cfg(test)]
mod storage_test;
