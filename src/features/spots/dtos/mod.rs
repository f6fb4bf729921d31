mod spot_dto;

pub use spot_dto::{
    ExtractSpotRequestDto, PageMetadataDto, SpotCandidate, SpotDetails, SpotResponseDto,
};
